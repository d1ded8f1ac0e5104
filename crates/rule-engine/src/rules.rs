//! Rule descriptors and the ordered rule set

use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::facts::FactSet;
use crate::report::{format_fine, Finding, ViolationReport};
use crate::severity::Severity;

/// General speed limit (km/h)
pub const SPEED_LIMIT_KMH: u32 = 40;

/// Safe speed for motorcycles (km/h)
pub const MOTORCYCLE_SAFE_SPEED_KMH: u32 = 60;

/// What a fired rule costs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty {
    pub law_code: &'static str,
    /// Fine amount (KHR)
    pub fine: u64,
    pub severity: Severity,
}

/// One band of a tiered penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Inclusive upper bound of the excess; `None` is unbounded
    pub up_to: Option<u32>,
    pub penalty: Penalty,
}

/// Consequence of a rule firing
#[derive(Clone, Copy)]
pub enum Consequence {
    /// Always the same penalty
    Fixed(Penalty),
    /// Penalty picked by how far `measure` exceeds `limit`.
    ///
    /// Tiers are checked in order and the first whose bound covers the
    /// excess wins.
    Tiered {
        measure: fn(&FactSet) -> u32,
        limit: u32,
        tiers: &'static [Tier],
    },
}

impl fmt::Debug for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consequence::Fixed(penalty) => f.debug_tuple("Fixed").field(penalty).finish(),
            Consequence::Tiered { limit, tiers, .. } => f
                .debug_struct("Tiered")
                .field("limit", limit)
                .field("tiers", tiers)
                .finish(),
        }
    }
}

/// A declarative traffic rule.
///
/// `description` may contain `{excess}` and `{limit}` placeholders, which are
/// filled in for tiered rules.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub applies: fn(&FactSet) -> bool,
    pub consequence: Consequence,
    pub description: &'static str,
    pub advice: &'static str,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("consequence", &self.consequence)
            .field("description", &self.description)
            .finish()
    }
}

impl Rule {
    /// Evaluate this rule alone against a fact set
    pub fn fire(&self, facts: &FactSet) -> Option<Finding> {
        if !(self.applies)(facts) {
            return None;
        }

        let (penalty, description) = match self.consequence {
            Consequence::Fixed(penalty) => (penalty, self.description.to_string()),
            Consequence::Tiered {
                measure,
                limit,
                tiers,
            } => {
                let excess = measure(facts).saturating_sub(limit);
                if excess == 0 {
                    return None;
                }
                let tier = tiers
                    .iter()
                    .find(|tier| tier.up_to.map_or(true, |bound| excess <= bound))?;
                (tier.penalty, render(self.description, excess, limit))
            }
        };

        Some(Finding {
            rule_id: self.id,
            description,
            law_code: penalty.law_code,
            fine: penalty.fine,
            severity: penalty.severity,
            advice: self.advice,
        })
    }

    /// Every law code this rule can produce
    pub fn law_codes(&self) -> Vec<&'static str> {
        match self.consequence {
            Consequence::Fixed(penalty) => vec![penalty.law_code],
            Consequence::Tiered { tiers, .. } => tiers.iter().map(|t| t.penalty.law_code).collect(),
        }
    }
}

fn render(template: &str, excess: u32, limit: u32) -> String {
    template
        .replace("{excess}", &excess.to_string())
        .replace("{limit}", &limit.to_string())
}

fn helmet_not_worn(facts: &FactSet) -> bool {
    facts.is_motorcycle() && facts.helmet_missing()
}

fn no_valid_license(facts: &FactSet) -> bool {
    facts.license_missing()
}

fn unregistered(facts: &FactSet) -> bool {
    facts.registration.is_no()
}

fn over_speed_limit(facts: &FactSet) -> bool {
    facts.speed > SPEED_LIMIT_KMH
}

fn observed_speed(facts: &FactSet) -> u32 {
    facts.speed
}

fn motorcycle_over_safe_speed(facts: &FactSet) -> bool {
    facts.is_motorcycle() && facts.speed > MOTORCYCLE_SAFE_SPEED_KMH
}

fn ran_red_light(facts: &FactSet) -> bool {
    facts.red_light.is_yes()
}

fn using_phone(facts: &FactSet) -> bool {
    facts.phone.is_yes()
}

fn under_influence(facts: &FactSet) -> bool {
    facts.alcohol.is_yes()
}

static SPEEDING_TIERS: [Tier; 3] = [
    Tier {
        up_to: Some(10),
        penalty: Penalty {
            law_code: "TL003",
            fine: 20_000,
            severity: Severity::Minor,
        },
    },
    Tier {
        up_to: Some(20),
        penalty: Penalty {
            law_code: "TL004",
            fine: 40_000,
            severity: Severity::Moderate,
        },
    },
    Tier {
        up_to: None,
        penalty: Penalty {
            law_code: "TL005",
            fine: 80_000,
            severity: Severity::Severe,
        },
    },
];

/// The standard rule table, in evaluation order
pub static STANDARD_RULES: [Rule; 8] = [
    Rule {
        id: "helmet",
        applies: helmet_not_worn,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL001",
            fine: 15_000,
            severity: Severity::Minor,
        }),
        description: "Riding motorcycle without helmet",
        advice: "Always wear a helmet when riding a motorcycle",
    },
    Rule {
        id: "license",
        applies: no_valid_license,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL002",
            fine: 50_000,
            severity: Severity::Severe,
        }),
        description: "Driving without a valid license",
        advice: "Get a proper driving license before operating any vehicle",
    },
    Rule {
        id: "registration",
        applies: unregistered,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL010",
            fine: 100_000,
            severity: Severity::Severe,
        }),
        description: "Vehicle not registered",
        advice: "Register your vehicle with proper authorities",
    },
    Rule {
        id: "speeding",
        applies: over_speed_limit,
        consequence: Consequence::Tiered {
            measure: observed_speed,
            limit: SPEED_LIMIT_KMH,
            tiers: &SPEEDING_TIERS,
        },
        description: "Speeding - {excess} km/h over the {limit} km/h limit",
        advice: "Follow speed limits to ensure safety",
    },
    Rule {
        id: "motorcycle_speed",
        applies: motorcycle_over_safe_speed,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL006",
            fine: 30_000,
            severity: Severity::Moderate,
        }),
        description: "Motorcycle exceeding safe speed of 60 km/h",
        advice: "Motorcycles should not exceed 60 km/h for safety",
    },
    Rule {
        id: "red_light",
        applies: ran_red_light,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL007",
            fine: 100_000,
            severity: Severity::Severe,
        }),
        description: "Running red light",
        advice: "Always stop at red lights - it prevents accidents",
    },
    Rule {
        id: "phone",
        applies: using_phone,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL008",
            fine: 25_000,
            severity: Severity::Minor,
        }),
        description: "Using mobile phone while driving",
        advice: "Use hands-free devices or pull over to use your phone",
    },
    Rule {
        id: "alcohol",
        applies: under_influence,
        consequence: Consequence::Fixed(Penalty {
            law_code: "TL009",
            fine: 500_000,
            severity: Severity::Severe,
        }),
        description: "Driving under influence of alcohol",
        advice: "NEVER drink and drive - take a taxi or use a designated driver",
    },
];

/// Ordered collection of rules; every applicable rule fires
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set evaluated in the given order
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The standard traffic rule table
    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec())
    }

    /// Append a rule, evaluated after all existing ones
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fired rules in evaluation order
    pub fn findings(&self, facts: &FactSet) -> Vec<Finding> {
        self.rules
            .iter()
            .filter_map(|rule| rule.fire(facts))
            .inspect(|finding| {
                debug!(
                    "Rule {} fired: {} ({}, {} KHR, {})",
                    finding.rule_id,
                    finding.description,
                    finding.law_code,
                    finding.fine,
                    finding.severity
                );
            })
            .collect()
    }

    /// Evaluate a fact set into a report
    pub fn evaluate(&self, facts: &FactSet) -> ViolationReport {
        let report = ViolationReport::from_findings(&self.findings(facts));
        debug!(
            "Evaluated {} vehicle: {} violation(s), fine {} KHR, severity {}",
            facts.vehicle,
            report.violation_count(),
            format_fine(report.fine),
            report.severity
        );
        report
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Process-wide standard rule set
pub fn standard_rules() -> &'static RuleSet {
    static STANDARD: OnceLock<RuleSet> = OnceLock::new();
    STANDARD.get_or_init(RuleSet::standard)
}

/// Evaluate a fact set against the standard rule table
pub fn evaluate(facts: &FactSet) -> ViolationReport {
    standard_rules().evaluate(facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportStatus;

    #[test]
    fn test_standard_table_codes_in_order() {
        let codes: Vec<_> = RuleSet::standard()
            .rules()
            .iter()
            .flat_map(|r| r.law_codes())
            .collect();
        assert_eq!(
            codes,
            vec!["TL001", "TL002", "TL010", "TL003", "TL004", "TL005", "TL006", "TL007", "TL008", "TL009"]
        );
    }

    #[test]
    fn test_speeding_tier_boundaries() {
        let cases = [
            (41, "TL003", 20_000, Severity::Minor),
            (50, "TL003", 20_000, Severity::Minor),
            (51, "TL004", 40_000, Severity::Moderate),
            (60, "TL004", 40_000, Severity::Moderate),
            (61, "TL005", 80_000, Severity::Severe),
        ];

        for (speed, code, fine, severity) in cases {
            let report = evaluate(&FactSet::new("car").with_speed(speed));
            assert_eq!(report.law_codes, vec![code], "speed {speed}");
            assert_eq!(report.fine, fine, "speed {speed}");
            assert_eq!(report.severity, severity, "speed {speed}");
        }
    }

    #[test]
    fn test_at_limit_is_legal() {
        let report = evaluate(&FactSet::new("car").with_speed(SPEED_LIMIT_KMH));
        assert_eq!(report.status, ReportStatus::Legal);
    }

    #[test]
    fn test_speeding_description_embeds_excess() {
        let report = evaluate(&FactSet::new("car").with_speed(55));
        assert_eq!(report.violations, vec!["Speeding - 15 km/h over the 40 km/h limit"]);
    }

    #[test]
    fn test_helmet_only_checked_for_motorcycles() {
        let report = evaluate(&FactSet::new("car").with_helmet("no"));
        assert_eq!(report.status, ReportStatus::Legal);
    }

    #[test]
    fn test_motorcycle_speeding_is_additive() {
        let report = evaluate(&FactSet::new("motorcycle").with_helmet("yes").with_speed(70));
        assert_eq!(report.law_codes, vec!["TL005", "TL006"]);
        assert_eq!(report.fine, 110_000);
        assert_eq!(report.severity, Severity::Severe);
    }

    #[test]
    fn test_motorcycle_at_safe_speed() {
        let report = evaluate(&FactSet::new("motorcycle").with_speed(60));
        assert_eq!(report.law_codes, vec!["TL004"]);
    }

    #[test]
    fn test_missing_helmet_and_license_do_not_trigger() {
        let facts = FactSet::new("motorcycle");
        assert_eq!(facts.helmet, None);
        assert_eq!(facts.license, None);
        assert_eq!(evaluate(&facts).status, ReportStatus::Legal);
    }

    #[test]
    fn test_extended_rule_set() {
        fn heavy(facts: &FactSet) -> bool {
            facts.vehicle == "truck"
        }

        let rules = RuleSet::standard().with_rule(Rule {
            id: "truck",
            applies: heavy,
            consequence: Consequence::Fixed(Penalty {
                law_code: "TL099",
                fine: 1_000,
                severity: Severity::Minor,
            }),
            description: "Truck in restricted zone",
            advice: "Use the designated truck route",
        });

        assert_eq!(rules.len(), 9);
        let report = rules.evaluate(&FactSet::new("truck").with_phone("yes"));
        assert_eq!(report.law_codes, vec!["TL008", "TL099"]);
        assert_eq!(report.fine, 26_000);
    }

    #[test]
    fn test_empty_rule_set_is_always_legal() {
        let rules = RuleSet::new(Vec::new());
        assert!(rules.is_empty());
        let report = rules.evaluate(&FactSet::new("car").with_alcohol("yes"));
        assert_eq!(report.status, ReportStatus::Legal);
    }

    #[test]
    fn test_findings_carry_rule_ids() {
        let findings = standard_rules().findings(
            &FactSet::new("car")
                .with_registration("no")
                .with_red_light("yes"),
        );
        let ids: Vec<_> = findings.iter().map(|f| f.rule_id).collect();
        assert_eq!(ids, vec!["registration", "red_light"]);
    }
}
