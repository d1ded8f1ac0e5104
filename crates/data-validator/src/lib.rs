//! Input Validation
//!
//! Validates stop submissions at the service boundary and extracts the fact
//! set handed to the rule engine. Out-of-domain input (negative or
//! non-numeric speed, missing officer form fields) is rejected here so the
//! rule engine only ever sees well-formed facts.

mod error;
mod input;
mod validator;

pub use error::ValidationError;
pub use input::{RawFacts, RawStop, SpeedInput};
pub use validator::{DriverDetails, ValidatedStop, ValidationConfig, Validator};
