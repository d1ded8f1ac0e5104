//! Violation report assembly

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// Summary message for a stop with no violations
pub const LEGAL_MESSAGE: &str = "No violations detected. You are following traffic rules!";

/// Advice given when no rule fired
pub const LEGAL_ADVICE: &str = "Keep driving safely and responsibly";

/// Overall outcome of an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Legal,
    Violation,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Legal => "legal",
            ReportStatus::Violation => "violation",
        }
    }
}

/// A single fired rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Identifier of the rule that fired
    pub rule_id: &'static str,
    /// Human-readable violation description
    pub description: String,
    /// Law code the violation is recorded under
    pub law_code: &'static str,
    /// Fine amount (KHR)
    pub fine: u64,
    pub severity: Severity,
    pub advice: &'static str,
}

/// Result of evaluating one fact set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    pub status: ReportStatus,
    pub message: String,
    pub violations: Vec<String>,
    /// Total fine (KHR)
    pub fine: u64,
    pub advice: Vec<String>,
    pub law_codes: Vec<String>,
    pub severity: Severity,
}

impl ViolationReport {
    /// Report for a stop where no rule fired
    pub fn legal() -> Self {
        Self {
            status: ReportStatus::Legal,
            message: LEGAL_MESSAGE.to_string(),
            violations: Vec::new(),
            fine: 0,
            advice: vec![LEGAL_ADVICE.to_string()],
            law_codes: Vec::new(),
            severity: Severity::None,
        }
    }

    /// Assemble a report from findings in rule order
    pub fn from_findings(findings: &[Finding]) -> Self {
        if findings.is_empty() {
            return Self::legal();
        }

        let mut report = Self {
            status: ReportStatus::Violation,
            message: format!("Found {} violation(s)", findings.len()),
            violations: Vec::with_capacity(findings.len()),
            fine: 0,
            advice: Vec::with_capacity(findings.len()),
            law_codes: Vec::with_capacity(findings.len()),
            severity: Severity::None,
        };

        for finding in findings {
            report.violations.push(finding.description.clone());
            report.law_codes.push(finding.law_code.to_string());
            report.advice.push(finding.advice.to_string());
            report.fine += finding.fine;
            report.severity = report.severity.max(finding.severity);
        }

        report
    }

    pub fn is_violation(&self) -> bool {
        self.status == ReportStatus::Violation
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Format a fine with thousands separators, e.g. `800000` as `"800,000"`
pub fn format_fine(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(code: &'static str, fine: u64, severity: Severity) -> Finding {
        Finding {
            rule_id: "test",
            description: format!("violation {code}"),
            law_code: code,
            fine,
            severity,
            advice: "advice",
        }
    }

    #[test]
    fn test_legal_report() {
        let report = ViolationReport::from_findings(&[]);
        assert_eq!(report.status, ReportStatus::Legal);
        assert_eq!(report.message, LEGAL_MESSAGE);
        assert_eq!(report.fine, 0);
        assert_eq!(report.severity, Severity::None);
        assert!(report.violations.is_empty());
        assert_eq!(report.advice, vec![LEGAL_ADVICE.to_string()]);
    }

    #[test]
    fn test_aggregation_keeps_order() {
        let report = ViolationReport::from_findings(&[
            finding("TL008", 25000, Severity::Minor),
            finding("TL007", 100000, Severity::Severe),
            finding("TL006", 30000, Severity::Moderate),
        ]);

        assert_eq!(report.message, "Found 3 violation(s)");
        assert_eq!(report.law_codes, vec!["TL008", "TL007", "TL006"]);
        assert_eq!(report.fine, 155000);
        assert_eq!(report.severity, Severity::Severe);
        assert_eq!(report.advice.len(), 3);
    }

    #[test]
    fn test_serialized_field_order() {
        let json = serde_json::to_string(&ViolationReport::legal()).unwrap();
        let keys: Vec<_> = ["status", "message", "violations", "fine", "advice", "law_codes", "severity"]
            .iter()
            .map(|k| json.find(&format!("\"{k}\"")).unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"status\":\"legal\""));
    }

    #[test]
    fn test_format_fine() {
        assert_eq!(format_fine(0), "0");
        assert_eq!(format_fine(999), "999");
        assert_eq!(format_fine(15000), "15,000");
        assert_eq!(format_fine(800000), "800,000");
        assert_eq!(format_fine(2000000000), "2,000,000,000");
    }
}
