//! slimcheck core - container image build-policy advisor
//!
//! Provides the advisor pipeline:
//! - Parses a minimal multi-stage build description into a [`BuildSpec`]
//! - Loads the builtin size-optimization [`RuleCatalog`]
//! - Evaluates the catalog against a spec to produce a [`Report`]
//!
//! The pipeline is stateless: the catalog is loaded once and shared by
//! reference, each spec lives for a single evaluation, and reports are
//! returned to the caller for rendering.

pub mod advisor;
pub mod catalog;
pub mod error;
pub mod obs;
pub mod report;
pub mod spec;
pub mod stage;
pub mod telemetry;

// Re-export key types
pub use advisor::{evaluate, Finding, Report};
pub use catalog::{Rule, RuleCatalog, RuleCheck, Severity};
pub use error::{AdvisorError, ConfigError, EvaluationError, ParseError, Result};
pub use report::{render_json, render_text, FindingArtifact, ReportArtifact};
pub use spec::{parse, serialize, BuildSpec};
pub use stage::{CopyStep, Stage};
pub use telemetry::init_tracing;

/// slimcheck version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
