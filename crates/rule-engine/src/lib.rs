//! Traffic Violation Rule Engine
//!
//! Evaluates the observed facts of a traffic stop against an ordered table of
//! rules and aggregates every fired rule into a single report:
//! - Violation descriptions and law codes, in rule order
//! - Total fine (sum of fired rules)
//! - Overall severity (maximum of fired rules)
//! - Advice for the driver
//!
//! Evaluation is pure and holds no state between calls.

mod facts;
mod report;
mod rules;
mod severity;

pub use facts::{Answer, FactSet, MOTORCYCLE};
pub use report::{format_fine, Finding, ReportStatus, ViolationReport, LEGAL_ADVICE, LEGAL_MESSAGE};
pub use rules::{
    evaluate, standard_rules, Consequence, Penalty, Rule, RuleSet, Tier,
    MOTORCYCLE_SAFE_SPEED_KMH, SPEED_LIMIT_KMH, STANDARD_RULES,
};
pub use severity::Severity;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compliant_car_is_legal() {
        let facts = FactSet::new("car")
            .with_speed(30)
            .with_license("yes")
            .with_registration("yes");
        let report = evaluate(&facts);

        assert_eq!(report.status, ReportStatus::Legal);
        assert_eq!(report.fine, 0);
        assert_eq!(report.severity, Severity::None);
        assert!(report.law_codes.is_empty());
    }

    #[test]
    fn test_motorcycle_without_helmet() {
        let facts = FactSet::new("motorcycle")
            .with_helmet("no")
            .with_speed(30)
            .with_license("yes");
        let report = evaluate(&facts);

        assert_eq!(report.violations, vec!["Riding motorcycle without helmet"]);
        assert_eq!(report.fine, 15_000);
        assert_eq!(report.severity, Severity::Minor);
        assert_eq!(report.message, "Found 1 violation(s)");
    }

    #[test]
    fn test_car_fifteen_over_limit() {
        let report = evaluate(&FactSet::new("car").with_speed(55).with_license("yes"));

        assert_eq!(report.fine, 40_000);
        assert_eq!(report.severity, Severity::Moderate);
        assert_eq!(report.law_codes, vec!["TL004"]);
    }

    #[test]
    fn test_everything_wrong_on_a_motorcycle() {
        let facts = FactSet::new("motorcycle")
            .with_helmet("no")
            .with_speed(70)
            .with_license("no")
            .with_red_light("yes")
            .with_phone("yes")
            .with_alcohol("yes");
        let report = evaluate(&facts);

        assert_eq!(report.status, ReportStatus::Violation);
        assert_eq!(report.violations.len(), 7);
        assert_eq!(
            report.law_codes,
            vec!["TL001", "TL002", "TL005", "TL006", "TL007", "TL008", "TL009"]
        );
        assert_eq!(report.fine, 800_000);
        assert_eq!(report.severity, Severity::Severe);
        assert_eq!(report.violations[2], "Speeding - 30 km/h over the 40 km/h limit");
    }

    #[test]
    fn test_unregistered_car() {
        let report = evaluate(&FactSet::new("car").with_registration("no"));

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.fine, 100_000);
        assert_eq!(report.severity, Severity::Severe);
        assert_eq!(report.law_codes, vec!["TL010"]);
    }

    #[test]
    fn test_unrecognized_answers_fail_open() {
        let facts = FactSet::new("motorcycle")
            .with_helmet("NO")
            .with_license("unknown")
            .with_registration("n")
            .with_red_light("true")
            .with_phone("Yes")
            .with_alcohol("1");
        assert_eq!(evaluate(&facts).status, ReportStatus::Legal);
    }

    #[test]
    fn test_report_json_shape() {
        let report = evaluate(&FactSet::new("car").with_phone("yes"));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "violation");
        assert_eq!(json["severity"], "minor");
        assert_eq!(json["fine"], 25_000);
        assert_eq!(json["law_codes"][0], "TL008");
        assert_eq!(
            json["advice"][0],
            "Use hands-free devices or pull over to use your phone"
        );
    }

    fn arb_answer() -> impl Strategy<Value = Answer> {
        prop_oneof![
            Just(Answer::Yes),
            Just(Answer::No),
            "[a-zA-Z]{0,4}".prop_map(Answer::from),
        ]
    }

    fn arb_facts() -> impl Strategy<Value = FactSet> {
        (
            prop_oneof![Just("motorcycle"), Just("car"), Just("truck"), Just("")],
            proptest::option::of(arb_answer()),
            0u32..200,
            proptest::option::of(arb_answer()),
            arb_answer(),
            arb_answer(),
            arb_answer(),
            arb_answer(),
        )
            .prop_map(
                |(vehicle, helmet, speed, license, registration, red_light, phone, alcohol)| {
                    FactSet {
                        vehicle: vehicle.to_string(),
                        helmet,
                        speed,
                        license,
                        registration,
                        red_light,
                        phone,
                        alcohol,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn report_matches_fired_rules(facts in arb_facts()) {
            let findings = standard_rules().findings(&facts);
            let report = evaluate(&facts);

            let fine: u64 = findings.iter().map(|f| f.fine).sum();
            let severity = findings.iter().map(|f| f.severity).max().unwrap_or(Severity::None);
            prop_assert_eq!(report.fine, fine);
            prop_assert_eq!(report.severity, severity);
            prop_assert_eq!(report.violations.len(), findings.len());
        }

        #[test]
        fn report_invariants_hold(facts in arb_facts()) {
            let report = evaluate(&facts);
            let legal = report.status == ReportStatus::Legal;

            prop_assert_eq!(legal, report.violations.is_empty());
            prop_assert_eq!(legal, report.fine == 0);
            prop_assert_eq!(legal, report.severity == Severity::None);
            prop_assert_eq!(report.violations.len(), report.law_codes.len());
            if !legal {
                prop_assert_eq!(report.violations.len(), report.advice.len());
            }
        }

        #[test]
        fn at_most_one_speeding_tier(speed in 0u32..500) {
            let report = evaluate(&FactSet::new("car").with_speed(speed));
            let tiers = report
                .law_codes
                .iter()
                .filter(|c| matches!(c.as_str(), "TL003" | "TL004" | "TL005"))
                .count();
            prop_assert_eq!(tiers, usize::from(speed > SPEED_LIMIT_KMH));
        }
    }
}
