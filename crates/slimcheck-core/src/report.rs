//! Report rendering for humans and CI.
//!
//! Text output is one line per finding (`[SEVERITY] rule_id: message`)
//! plus a verdict trailer; JSON output is a [`ReportArtifact`] mapping
//! rule ids to their outcomes for machine consumption.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::advisor::{Finding, Report};
use crate::catalog::Severity;

/// One rule outcome in the machine-readable artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FindingArtifact {
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
}

/// Machine-readable report for CI consumption: rule id → outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportArtifact {
    pub overall_passed: bool,
    pub rules: BTreeMap<String, FindingArtifact>,
}

impl ReportArtifact {
    /// Build the artifact from a report.
    pub fn from_report(report: &Report) -> Self {
        let rules = report
            .findings
            .iter()
            .map(|finding| (finding.rule_id.clone(), FindingArtifact::from(finding)))
            .collect();

        Self {
            overall_passed: report.overall_passed,
            rules,
        }
    }
}

impl From<&Finding> for FindingArtifact {
    fn from(finding: &Finding) -> Self {
        Self {
            severity: finding.severity,
            passed: finding.passed,
            message: finding.message.clone(),
        }
    }
}

/// Render a report as human-readable text.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    for finding in &report.findings {
        out.push_str(&format!(
            "[{}] {}: {}\n",
            finding.severity.label(),
            finding.rule_id,
            finding.message
        ));
    }

    out.push_str(&format!(
        "\n{} rules evaluated, {} failed\n",
        report.findings.len(),
        report.failed_count()
    ));
    out.push_str(&format!(
        "verdict: {}\n",
        if report.overall_passed {
            "PASSED"
        } else {
            "FAILED"
        }
    ));

    out
}

/// Render a report as pretty-printed artifact JSON.
pub fn render_json(report: &Report) -> crate::error::Result<String> {
    let artifact = ReportArtifact::from_report(report);
    Ok(serde_json::to_string_pretty(&artifact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report {
            findings: vec![
                Finding {
                    rule_id: "multi-stage".to_string(),
                    severity: Severity::Error,
                    passed: false,
                    message: "build defines 1 stage(s); split build and runtime into separate stages"
                        .to_string(),
                },
                Finding {
                    rule_id: "minimal-base".to_string(),
                    severity: Severity::Warn,
                    passed: true,
                    message: "final stage starts from a minimal base image (scratch, alpine, distroless, slim)"
                        .to_string(),
                },
            ],
            overall_passed: false,
        }
    }

    #[test]
    fn test_render_text_is_stable() {
        let actual = render_text(&sample_report());
        let expected = "\
[ERROR] multi-stage: build defines 1 stage(s); split build and runtime into separate stages
[WARN] minimal-base: final stage starts from a minimal base image (scratch, alpine, distroless, slim)

2 rules evaluated, 1 failed
verdict: FAILED
";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_artifact_json_output_stability() {
        let actual = render_json(&sample_report()).unwrap();
        let expected = r#"{
  "overall_passed": false,
  "rules": {
    "minimal-base": {
      "severity": "warn",
      "passed": true,
      "message": "final stage starts from a minimal base image (scratch, alpine, distroless, slim)"
    },
    "multi-stage": {
      "severity": "error",
      "passed": false,
      "message": "build defines 1 stage(s); split build and runtime into separate stages"
    }
  }
}"#;
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_artifact_maps_every_finding() {
        let report = sample_report();
        let artifact = ReportArtifact::from_report(&report);

        assert_eq!(artifact.rules.len(), report.findings.len());
        let multi = artifact.rules.get("multi-stage").expect("multi-stage entry");
        assert!(!multi.passed);
        assert_eq!(multi.severity, Severity::Error);
    }
}
