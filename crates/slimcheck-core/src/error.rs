//! Error taxonomy for the advisor pipeline.

/// Errors produced while parsing a build description.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("build description has no stages (expected at least one FROM)")]
    NoStages,

    #[error("line {line}: FROM has an empty base image reference")]
    EmptyBaseImage { line: usize },

    #[error("line {line}: malformed FROM (expected FROM <image> [AS <name>])")]
    MalformedFrom { line: usize },

    #[error("line {line}: {instruction} before the first FROM")]
    InstructionOutsideStage { line: usize, instruction: String },

    #[error("line {line}: duplicate stage name: {name}")]
    DuplicateStageName { line: usize, name: String },

    #[error("line {line}: COPY requires at least one source and a destination")]
    MalformedCopy { line: usize },

    #[error("line {line}: unknown instruction: {instruction}")]
    UnknownInstruction { line: usize, instruction: String },

    #[error("build spec must have exactly one final stage, found {count}")]
    FinalStageCount { count: usize },

    #[error("final stage must be the last stage")]
    FinalStageNotLast,
}

/// Errors produced while loading the rule catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("duplicate rule id: {id}")]
    DuplicateRuleId { id: String },

    #[error("rule {id} has an empty description")]
    EmptyDescription { id: String },
}

/// A rule check that could not be evaluated against a spec.
///
/// Caught per-rule by the engine and converted into a failed
/// `Error`-severity finding; never propagated to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("spec has no final stage")]
    NoFinalStage,
}

/// Top-level advisor errors.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
