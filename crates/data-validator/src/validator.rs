//! Validator turning raw input into fact sets

use crate::error::ValidationError;
use crate::input::{RawFacts, RawStop, SpeedInput};
use rule_engine::{Answer, FactSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Speed valid range (km/h)
    pub speed_range: (i64, i64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            speed_range: (0, 300),
        }
    }
}

/// Driver and vehicle details passed through to storage untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDetails {
    pub driver_name: String,
    pub license_number: Option<String>,
    pub plate_number: String,
}

/// A validated officer-recorded stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStop {
    pub officer_id: i64,
    pub driver: DriverDetails,
    pub description: String,
    pub location: String,
    pub facts: FactSet,
}

/// Input validator for stop submissions
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: i64,
        range: (i64, i64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Parse and range-check a submitted speed; absent means 0
    pub fn validate_speed(&self, speed: Option<&SpeedInput>) -> Result<u32, ValidationError> {
        let value = match speed {
            None => 0,
            Some(SpeedInput::Whole(v)) => *v,
            // Fractions truncate toward zero
            Some(SpeedInput::Fractional(v)) if v.is_finite() => v.trunc() as i64,
            Some(SpeedInput::Fractional(v)) => {
                return Err(ValidationError::InvalidFormat {
                    field: "speed",
                    value: v.to_string(),
                })
            }
            Some(SpeedInput::Text(raw)) => {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::InvalidFormat {
                        field: "speed",
                        value: raw.clone(),
                    })?
            }
        };

        self.validate_range("speed", value, self.config.speed_range)?;
        u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
            field: "speed",
            value,
            min: 0,
            max: i64::from(u32::MAX),
        })
    }

    /// Build the fact set for an evaluation.
    ///
    /// Answer fields are taken verbatim; unrecognized values are left for the
    /// rule engine to treat as compliant.
    pub fn facts(&self, raw: &RawFacts) -> Result<FactSet, ValidationError> {
        let speed = self.validate_speed(raw.speed.as_ref())?;

        let mut facts = FactSet::new(raw.vehicle.clone().unwrap_or_default()).with_speed(speed);
        facts.helmet = raw.helmet.as_deref().map(Answer::from);
        facts.license = raw.license.as_deref().map(Answer::from);
        if let Some(registration) = raw.registration.as_deref() {
            facts.registration = Answer::from(registration);
        }
        if let Some(red_light) = raw.red_light.as_deref() {
            facts.red_light = Answer::from(red_light);
        }
        if let Some(phone) = raw.phone.as_deref() {
            facts.phone = Answer::from(phone);
        }
        if let Some(alcohol) = raw.alcohol.as_deref() {
            facts.alcohol = Answer::from(alcohol);
        }

        Ok(facts)
    }

    /// Validate an officer-recorded stop.
    ///
    /// Officer, driver name, plate number and vehicle type are required.
    pub fn stop(&self, raw: &RawStop) -> Result<ValidatedStop, ValidationError> {
        let officer_id = raw.officer_id.ok_or(ValidationError::MissingField("officer_id"))?;
        let driver_name = required("driver_name", raw.driver_name.as_deref())?;
        let plate_number = required("plate_number", raw.plate_number.as_deref())?;
        required("vehicle", raw.facts.vehicle.as_deref())?;

        let facts = self.facts(&raw.facts).inspect_err(|e| {
            warn!("Rejected stop for {}: {}", driver_name, e);
        })?;

        Ok(ValidatedStop {
            officer_id,
            driver: DriverDetails {
                driver_name,
                license_number: optional(raw.license_number.as_deref()),
                plate_number,
            },
            description: raw.description.clone().unwrap_or_default(),
            location: raw.location.clone().unwrap_or_default(),
            facts,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => {
            warn!("Rejected stop: missing {}", field);
            Err(ValidationError::MissingField(field))
        }
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
