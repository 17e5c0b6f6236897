//! Structured observability hooks for advisor invocations.
//!
//! Emission functions for the pipeline's lifecycle points: spec parsed,
//! report ready. Fields are structured so JSON log pipelines can index
//! them; the spec digest correlates log lines with CI artifacts.

use tracing::info;

/// Emit event: a build description was parsed into a spec.
pub fn emit_spec_parsed(stage_count: usize, spec_digest: &str) {
    info!(
        event = "spec.parsed",
        stage_count = stage_count,
        spec_digest = %spec_digest,
    );
}

/// Emit event: evaluation finished and a report is ready.
pub fn emit_report_ready(spec_digest: &str, findings: usize, failed: usize, overall_passed: bool) {
    info!(
        event = "report.ready",
        spec_digest = %spec_digest,
        findings = findings,
        failed = failed,
        overall_passed = overall_passed,
    );
}
