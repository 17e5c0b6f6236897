//! Advisor engine.
//!
//! Evaluates a [`RuleCatalog`] against a [`BuildSpec`] to produce a
//! [`Report`] — findings in catalog order plus the overall pass/fail
//! verdict used as a CI gate.

use serde::{Deserialize, Serialize};

use crate::catalog::{
    build_tool_commands, dirty_cache_commands, doc_copy_paths, unpinned_base_stages, Rule,
    RuleCatalog, RuleCheck, Severity,
};
use crate::obs::emit_report_ready;
use crate::spec::BuildSpec;

/// The result of evaluating one rule against one build spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    /// Id of the evaluated rule.
    pub rule_id: String,

    /// Severity the finding carries. Matches the rule's severity, except
    /// that a check which could not be evaluated is forced to `Error`.
    pub severity: Severity,

    /// Whether the rule passed.
    pub passed: bool,

    /// Rationale (passed) or violation detail (failed).
    pub message: String,
}

/// The aggregate outcome of all findings for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    /// Findings in catalog insertion order.
    pub findings: Vec<Finding>,

    /// False iff any `Error`-severity finding failed.
    pub overall_passed: bool,
}

impl Report {
    /// Number of passed findings.
    pub fn passed_count(&self) -> usize {
        self.findings.iter().filter(|f| f.passed).count()
    }

    /// Number of failed findings.
    pub fn failed_count(&self) -> usize {
        self.findings.iter().filter(|f| !f.passed).count()
    }
}

/// Evaluate every catalog rule against a spec.
///
/// Finding order follows catalog insertion order, so the same (spec,
/// catalog) pair always yields an identical report. A check that cannot
/// be evaluated becomes a failed `Error` finding instead of aborting the
/// remaining rules.
pub fn evaluate(spec: &BuildSpec, catalog: &RuleCatalog) -> Report {
    let mut findings = Vec::with_capacity(catalog.len());

    for rule in catalog.iter() {
        let finding = check_rule(rule, spec);
        tracing::debug!(
            rule_id = %finding.rule_id,
            passed = finding.passed,
            "rule evaluated"
        );
        findings.push(finding);
    }

    let overall_passed = !findings
        .iter()
        .any(|f| f.severity == Severity::Error && !f.passed);

    let failed = findings.iter().filter(|f| !f.passed).count();
    emit_report_ready(&spec.stages_digest(), findings.len(), failed, overall_passed);

    Report {
        findings,
        overall_passed,
    }
}

fn check_rule(rule: &Rule, spec: &BuildSpec) -> Finding {
    match rule.check.run(spec) {
        Ok(true) => Finding {
            rule_id: rule.id.clone(),
            severity: rule.severity,
            passed: true,
            message: rule.description.clone(),
        },
        Ok(false) => Finding {
            rule_id: rule.id.clone(),
            severity: rule.severity,
            passed: false,
            message: failure_message(&rule.check, spec),
        },
        Err(err) => Finding {
            rule_id: rule.id.clone(),
            severity: Severity::Error,
            passed: false,
            message: format!("check could not be evaluated: {err}"),
        },
    }
}

/// Violation detail for a failed check.
///
/// The check itself stays a pure boolean predicate; the detail is derived
/// here from the same helpers, so message and verdict cannot drift apart.
fn failure_message(check: &RuleCheck, spec: &BuildSpec) -> String {
    let final_base = || {
        spec.final_stage()
            .map(|s| s.base_image.clone())
            .unwrap_or_else(|| "<none>".to_string())
    };

    match check {
        RuleCheck::MultiStage => format!(
            "build defines {} stage(s); split build and runtime into separate stages",
            spec.stages.len()
        ),
        RuleCheck::MinimalBase => format!(
            "final stage base '{}' is not on the minimal-image allow-list",
            final_base()
        ),
        RuleCheck::NoDocsInFinalStage => {
            let paths = spec
                .final_stage()
                .map(doc_copy_paths)
                .unwrap_or_default();
            format!(
                "final stage copies documentation paths: [{}]",
                paths.join(", ")
            )
        }
        RuleCheck::PinnedBaseTag => {
            let stages = unpinned_base_stages(spec);
            format!(
                "stage(s) [{}] use an untagged or latest base image",
                stages.join(", ")
            )
        }
        RuleCheck::CleanPackageCache => {
            let commands = dirty_cache_commands(spec);
            format!(
                "{} install command(s) leave package caches behind: [{}]",
                commands.len(),
                commands.join("; ")
            )
        }
        RuleCheck::NoBuildToolsInFinal => {
            let commands = spec
                .final_stage()
                .map(build_tool_commands)
                .unwrap_or_default();
            format!(
                "final stage runs build tooling: [{}]",
                commands.join("; ")
            )
        }
        RuleCheck::ArtifactCopyIntoFinal => {
            "final stage copies no artifacts from earlier stages".to_string()
        }
    }
}
