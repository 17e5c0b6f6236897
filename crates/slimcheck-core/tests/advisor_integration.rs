//! Integration tests for the parse → evaluate → report pipeline.

use slimcheck_core::{
    evaluate, parse, render_text, serialize, BuildSpec, ReportArtifact, RuleCatalog, Severity,
    Stage,
};

/// Test: the golden path from the optimization guide — a multi-stage
/// build that ships a single binary on a distroless base.
#[test]
fn test_distroless_two_stage_spec_passes_gate() {
    let raw = "\
FROM golang:alpine AS build
RUN go build -o /go/bin/app ./cmd/app

FROM gcr.io/distroless/static AS runtime
COPY /go/bin/app /usr/local/bin/app
";
    let spec = parse(raw).expect("parse failed");
    let catalog = RuleCatalog::load().expect("catalog failed");
    let report = evaluate(&spec, &catalog);

    assert!(report.overall_passed, "gate should pass: {report:?}");

    let failed_errors: Vec<&str> = report
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Error && !f.passed)
        .map(|f| f.rule_id.as_str())
        .collect();
    assert!(failed_errors.is_empty(), "unexpected: {failed_errors:?}");

    for rule_id in ["multi-stage", "minimal-base"] {
        let finding = report
            .findings
            .iter()
            .find(|f| f.rule_id == rule_id)
            .unwrap_or_else(|| panic!("missing finding: {rule_id}"));
        assert!(finding.passed, "{rule_id} should pass");
    }
}

/// Test: a single-stage fat-base build fails the gate with an Error.
#[test]
fn test_single_stage_ubuntu_fails_gate() {
    let spec = parse("FROM ubuntu\nRUN apt-get install -y build-essential\n").unwrap();
    let catalog = RuleCatalog::load().unwrap();
    let report = evaluate(&spec, &catalog);

    let multi = report
        .findings
        .iter()
        .find(|f| f.rule_id == "multi-stage")
        .expect("multi-stage finding");

    assert!(!multi.passed);
    assert_eq!(multi.severity, Severity::Error);
    assert!(!report.overall_passed);
}

/// Test: documentation copied into the final stage fails the docs rule
/// without flipping the overall verdict (Warn severity).
#[test]
fn test_docs_copy_fails_rule_but_not_gate() {
    let raw = "\
FROM rust:1.79-slim AS build
RUN cargo build --release

FROM debian:bookworm-slim AS runtime
COPY target/release/app /usr/local/bin/app
COPY README.md /usr/share/doc/app/README.md
";
    let spec = parse(raw).unwrap();
    let catalog = RuleCatalog::load().unwrap();
    let report = evaluate(&spec, &catalog);

    let docs = report
        .findings
        .iter()
        .find(|f| f.rule_id == "no-docs-in-final-stage")
        .expect("docs finding");

    assert!(!docs.passed);
    assert_eq!(docs.severity, Severity::Warn);
    assert!(docs.message.contains("README.md"));
    assert!(report.overall_passed);
}

/// Test: round-trip property — parse(serialize(spec)) == spec.
#[test]
fn test_serialize_parse_round_trip() {
    let spec = BuildSpec::from_stages(vec![
        Stage::new("build", "golang:1.22-alpine")
            .with_command("go mod download")
            .with_command("go build -o /out/app ./cmd/app"),
        Stage::new("runtime", "gcr.io/distroless/static")
            .with_copy("/out/app", "/usr/local/bin/app")
            .finalized(),
    ])
    .expect("spec invariants");

    let reparsed = parse(&serialize(&spec)).expect("reparse failed");
    assert_eq!(spec, reparsed);
}

/// Test: evaluation is deterministic across invocations and catalog loads.
#[test]
fn test_evaluation_is_deterministic() {
    let raw = "FROM node:20\nRUN npm install\nRUN cp README.md /app/\n";
    let spec = parse(raw).unwrap();

    let first = evaluate(&spec, &RuleCatalog::load().unwrap());
    let second = evaluate(&spec, &RuleCatalog::load().unwrap());

    assert_eq!(first, second);
    assert_eq!(
        render_text(&first),
        render_text(&second),
        "rendered output should be stable too"
    );
}

/// Test: the artifact mapping covers every catalog rule exactly once.
#[test]
fn test_artifact_covers_catalog() {
    let spec = parse("FROM alpine:3.20\n").unwrap();
    let catalog = RuleCatalog::load().unwrap();
    let report = evaluate(&spec, &catalog);
    let artifact = ReportArtifact::from_report(&report);

    assert_eq!(artifact.rules.len(), catalog.len());
    for rule in catalog.iter() {
        assert!(
            artifact.rules.contains_key(&rule.id),
            "artifact missing rule {}",
            rule.id
        );
    }
    assert_eq!(artifact.overall_passed, report.overall_passed);
}

/// Test: a spec that bypassed invariant validation degrades to failed
/// Error findings instead of aborting evaluation.
#[test]
fn test_broken_spec_invariant_is_contained() {
    let spec: BuildSpec = serde_json::from_str(
        r#"{"stages":[{"name":"0","base_image":"alpine:3.20","is_final":false,"copied_paths":[],"commands":[]}]}"#,
    )
    .expect("deserialize");

    let catalog = RuleCatalog::load().unwrap();
    let report = evaluate(&spec, &catalog);

    // Every rule still produced a finding.
    assert_eq!(report.findings.len(), catalog.len());
    assert!(!report.overall_passed);
}
