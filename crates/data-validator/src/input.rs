//! Untrusted stop input as submitted by forms and JSON clients

use serde::{Deserialize, Serialize};

/// Speed as submitted: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedInput {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl From<&str> for SpeedInput {
    fn from(value: &str) -> Self {
        SpeedInput::Text(value.to_string())
    }
}

/// Fact fields of a stop before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFacts {
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub helmet: Option<String>,
    #[serde(default)]
    pub speed: Option<SpeedInput>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub registration: Option<String>,
    #[serde(default)]
    pub red_light: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub alcohol: Option<String>,
}

/// A field stop as recorded by an officer, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStop {
    #[serde(default)]
    pub officer_id: Option<i64>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub facts: RawFacts,
}
