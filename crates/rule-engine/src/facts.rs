//! Observed facts of a traffic stop

use serde::{Deserialize, Serialize};

/// Vehicle category that enables the motorcycle-specific rules
pub const MOTORCYCLE: &str = "motorcycle";

/// A yes/no observation as reported by an officer or citizen.
///
/// Anything other than an exact `"yes"` or `"no"` is kept verbatim and never
/// triggers a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Answer {
    Yes,
    No,
    Other(String),
}

impl Answer {
    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Yes)
    }

    pub fn is_no(&self) -> bool {
        matches!(self, Answer::No)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Other(raw) => raw,
        }
    }
}

impl From<&str> for Answer {
    fn from(raw: &str) -> Self {
        match raw {
            "yes" => Answer::Yes,
            "no" => Answer::No,
            other => Answer::Other(other.to_string()),
        }
    }
}

impl From<String> for Answer {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "yes" => Answer::Yes,
            "no" => Answer::No,
            _ => Answer::Other(raw),
        }
    }
}

impl From<Answer> for String {
    fn from(answer: Answer) -> Self {
        match answer {
            Answer::Yes => "yes".to_string(),
            Answer::No => "no".to_string(),
            Answer::Other(raw) => raw,
        }
    }
}

fn answer_yes() -> Answer {
    Answer::Yes
}

fn answer_no() -> Answer {
    Answer::No
}

/// Observations of a single stop, evaluated once and then discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet {
    /// Vehicle category, e.g. "motorcycle" or "car"
    #[serde(default)]
    pub vehicle: String,
    /// Helmet worn; only "no" triggers
    #[serde(default)]
    pub helmet: Option<Answer>,
    /// Observed speed (km/h)
    #[serde(default)]
    pub speed: u32,
    /// Valid license held; only "no" triggers
    #[serde(default)]
    pub license: Option<Answer>,
    /// Vehicle registered
    #[serde(default = "answer_yes")]
    pub registration: Answer,
    /// Ran a red light
    #[serde(default = "answer_no")]
    pub red_light: Answer,
    /// Used a phone while driving
    #[serde(default = "answer_no")]
    pub phone: Answer,
    /// Driving under the influence of alcohol
    #[serde(default = "answer_no")]
    pub alcohol: Answer,
}

impl Default for FactSet {
    fn default() -> Self {
        Self {
            vehicle: String::new(),
            helmet: None,
            speed: 0,
            license: None,
            registration: Answer::Yes,
            red_light: Answer::No,
            phone: Answer::No,
            alcohol: Answer::No,
        }
    }
}

impl FactSet {
    /// Start a fact set for the given vehicle category, all other facts compliant
    pub fn new(vehicle: impl Into<String>) -> Self {
        Self {
            vehicle: vehicle.into(),
            ..Default::default()
        }
    }

    pub fn with_helmet(mut self, helmet: impl Into<Answer>) -> Self {
        self.helmet = Some(helmet.into());
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_license(mut self, license: impl Into<Answer>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_registration(mut self, registration: impl Into<Answer>) -> Self {
        self.registration = registration.into();
        self
    }

    pub fn with_red_light(mut self, red_light: impl Into<Answer>) -> Self {
        self.red_light = red_light.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<Answer>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_alcohol(mut self, alcohol: impl Into<Answer>) -> Self {
        self.alcohol = alcohol.into();
        self
    }

    /// Whether the motorcycle-specific rules apply
    pub fn is_motorcycle(&self) -> bool {
        self.vehicle == MOTORCYCLE
    }

    pub fn helmet_missing(&self) -> bool {
        self.helmet.as_ref().is_some_and(Answer::is_no)
    }

    pub fn license_missing(&self) -> bool {
        self.license.as_ref().is_some_and(Answer::is_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_parsing_is_exact() {
        assert_eq!(Answer::from("yes"), Answer::Yes);
        assert_eq!(Answer::from("no"), Answer::No);
        assert_eq!(Answer::from("No"), Answer::Other("No".to_string()));
        assert_eq!(Answer::from(""), Answer::Other(String::new()));
    }

    #[test]
    fn test_defaults_are_compliant() {
        let facts = FactSet::default();
        assert!(facts.registration.is_yes());
        assert!(!facts.red_light.is_yes());
        assert!(!facts.helmet_missing());
        assert!(!facts.license_missing());
        assert_eq!(facts.speed, 0);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let facts: FactSet =
            serde_json::from_str(r#"{"vehicle":"motorcycle","helmet":"no","speed":35}"#).unwrap();

        assert!(facts.is_motorcycle());
        assert!(facts.helmet_missing());
        assert_eq!(facts.license, None);
        assert_eq!(facts.registration, Answer::Yes);
        assert_eq!(facts.alcohol, Answer::No);
    }

    #[test]
    fn test_unrecognized_answer_round_trips_verbatim() {
        let facts: FactSet = serde_json::from_str(r#"{"vehicle":"car","phone":"maybe"}"#).unwrap();
        assert_eq!(facts.phone, Answer::Other("maybe".to_string()));

        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json["phone"], "maybe");
    }
}
