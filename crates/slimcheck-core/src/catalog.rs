//! Rule catalog for image size-optimization checks.
//!
//! The catalog is loaded once into an immutable, ordered structure and
//! passed by reference into the advisor engine. Rules are independent and
//! additive: no precedence, no conflict resolution, each check is a pure
//! predicate over the spec.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EvaluationError};
use crate::spec::BuildSpec;
use crate::stage::Stage;

/// Rule severity. Only failed `Error` rules flip a report's overall verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Upper-case label used in rendered report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

/// Base image repositories considered minimal.
pub const MINIMAL_BASE_REPOSITORIES: &[&str] = &["scratch", "alpine", "busybox"];

/// Registry prefixes of curated minimal-image families.
pub const MINIMAL_BASE_PREFIXES: &[&str] = &["gcr.io/distroless/", "cgr.dev/chainguard/"];

/// Leading file-name markers of documentation payloads.
pub const DOC_FILE_PREFIXES: &[&str] = &["README", "LICENSE", "CHANGELOG", "NOTICE"];

/// Path segments that hold documentation trees.
pub const DOC_DIR_SEGMENTS: &[&str] = &["docs", "doc"];

/// Package-manager installs and the cache cleanup each must carry in the
/// same command (separate RUN lines re-inflate the layer).
pub const PACKAGE_CACHE_CLEANUPS: &[(&str, &str)] = &[
    ("apt-get install", "rm -rf /var/lib/apt/lists"),
    ("apt install", "rm -rf /var/lib/apt/lists"),
    ("apk add", "--no-cache"),
    ("yum install", "yum clean all"),
    ("dnf install", "dnf clean all"),
    ("pip install", "--no-cache-dir"),
];

/// Build tooling that should never run in the final stage.
pub const BUILD_TOOL_MARKERS: &[&str] = &[
    "gcc",
    "g++",
    "make",
    "cargo build",
    "go build",
    "npm install",
    "npm ci",
    "pip install",
    "mvn",
    "javac",
];

/// The closed table of rule predicates.
///
/// Each variant is a pure check over the spec. New rules add a variant and
/// a catalog entry; there is no open-ended dynamic dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCheck {
    /// More than one stage.
    MultiStage,
    /// Final stage base image is on the minimal-image allow-list.
    MinimalBase,
    /// Final stage copies no documentation paths.
    NoDocsInFinalStage,
    /// Every stage pins its base tag (and avoids `latest`).
    PinnedBaseTag,
    /// Package-manager installs clean their caches in the same command.
    CleanPackageCache,
    /// Final stage runs no build tooling.
    NoBuildToolsInFinal,
    /// Multi-stage builds copy at least one artifact into the final stage.
    ArtifactCopyIntoFinal,
}

impl RuleCheck {
    /// Run the check. `Ok(true)` means the rule passed.
    ///
    /// # Errors
    ///
    /// `EvaluationError::NoFinalStage` — the check needs the final stage
    /// but the spec's one-final invariant was bypassed.
    pub fn run(&self, spec: &BuildSpec) -> Result<bool, EvaluationError> {
        match self {
            RuleCheck::MultiStage => Ok(spec.stages.len() > 1),
            RuleCheck::MinimalBase => Ok(is_minimal_base(final_stage(spec)?)),
            RuleCheck::NoDocsInFinalStage => {
                Ok(doc_copy_paths(final_stage(spec)?).is_empty())
            }
            RuleCheck::PinnedBaseTag => Ok(unpinned_base_stages(spec).is_empty()),
            RuleCheck::CleanPackageCache => Ok(dirty_cache_commands(spec).is_empty()),
            RuleCheck::NoBuildToolsInFinal => {
                Ok(build_tool_commands(final_stage(spec)?).is_empty())
            }
            RuleCheck::ArtifactCopyIntoFinal => {
                if spec.stages.len() < 2 {
                    return Ok(true);
                }
                Ok(!final_stage(spec)?.copied_paths.is_empty())
            }
        }
    }
}

fn final_stage(spec: &BuildSpec) -> Result<&Stage, EvaluationError> {
    spec.final_stage().ok_or(EvaluationError::NoFinalStage)
}

/// Whether a stage's base image is on the minimal-image allow-list.
pub(crate) fn is_minimal_base(stage: &Stage) -> bool {
    let repo = stage.base_repository();
    if MINIMAL_BASE_REPOSITORIES.contains(&repo) {
        return true;
    }
    if MINIMAL_BASE_PREFIXES.iter().any(|p| repo.starts_with(p)) {
        return true;
    }
    // debian:bookworm-slim, python:3.12-alpine and friends
    stage.base_tag().is_some_and(|tag| {
        tag == "slim" || tag.ends_with("-slim") || tag == "alpine" || tag.ends_with("-alpine")
    })
}

/// Documentation paths copied into a stage, in copy order.
pub(crate) fn doc_copy_paths(stage: &Stage) -> Vec<String> {
    stage
        .copied_paths
        .iter()
        .filter(|copy| is_doc_path(&copy.source) || is_doc_path(&copy.dest))
        .map(|copy| copy.source.clone())
        .collect()
}

fn is_doc_path(path: &str) -> bool {
    let trimmed = path.trim_end_matches('/');
    if trimmed
        .split('/')
        .any(|segment| DOC_DIR_SEGMENTS.contains(&segment))
    {
        return true;
    }

    let file = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if file.ends_with(".md") {
        return true;
    }
    DOC_FILE_PREFIXES.iter().any(|p| file.starts_with(p))
}

/// Names of stages whose base image is untagged or tagged `latest`.
///
/// Exempt: `scratch`, digest-pinned references, and references to an
/// earlier stage by name.
pub(crate) fn unpinned_base_stages(spec: &BuildSpec) -> Vec<String> {
    let mut offenders = Vec::new();
    let mut earlier_names: HashSet<&str> = HashSet::new();

    for stage in &spec.stages {
        let exempt = stage.base_image == "scratch"
            || stage.base_is_digest_pinned()
            || earlier_names.contains(stage.base_image.as_str());

        if !exempt {
            match stage.base_tag() {
                Some("latest") | None => offenders.push(stage.name.clone()),
                Some(_) => {}
            }
        }

        earlier_names.insert(stage.name.as_str());
    }

    offenders
}

/// Commands that install packages without cleaning the cache in the same
/// command, across all stages.
pub(crate) fn dirty_cache_commands(spec: &BuildSpec) -> Vec<String> {
    let mut offenders = Vec::new();
    for stage in &spec.stages {
        for command in &stage.commands {
            let normalized = normalize_command(command);
            for (install, cleanup) in PACKAGE_CACHE_CLEANUPS {
                if normalized.contains(install) && !normalized.contains(cleanup) {
                    offenders.push(command.clone());
                    break;
                }
            }
        }
    }
    offenders
}

/// Final-stage commands that invoke build tooling.
pub(crate) fn build_tool_commands(stage: &Stage) -> Vec<String> {
    stage
        .commands
        .iter()
        .filter(|command| {
            let normalized = normalize_command(command);
            BUILD_TOOL_MARKERS
                .iter()
                .any(|marker| command_mentions(&normalized, marker))
        })
        .cloned()
        .collect()
}

/// Collapse runs of whitespace so multi-word markers match reliably.
fn normalize_command(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-word markers must match a whole token (`make`, not `cmake`);
/// multi-word markers match as a normalized substring.
fn command_mentions(normalized: &str, marker: &str) -> bool {
    if marker.contains(' ') {
        normalized.contains(marker)
    } else {
        normalized.split(' ').any(|token| token == marker)
    }
}

/// A single catalog rule: identity, rationale, severity, and its check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Unique rule identifier (kebab-case).
    pub id: String,

    /// Human-readable rationale.
    pub description: String,

    /// Severity of a failed check.
    pub severity: Severity,

    /// The predicate evaluated against a spec.
    pub check: RuleCheck,
}

impl Rule {
    fn new(id: &str, description: &str, severity: Severity, check: RuleCheck) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            severity,
            check,
        }
    }
}

/// The immutable, ordered rule catalog.
///
/// Load once at startup and pass by reference into
/// [`evaluate`](crate::advisor::evaluate); read-only afterwards, so
/// concurrent callers may share it without locking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Load the builtin catalog.
    ///
    /// # Errors
    ///
    /// `ConfigError::DuplicateRuleId` if two rules share an id.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_rules(builtin_rules())
    }

    /// Build a catalog from an explicit rule list, validating uniqueness.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for rule in &rules {
            if rule.description.is_empty() {
                return Err(ConfigError::EmptyDescription {
                    id: rule.id.clone(),
                });
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::DuplicateRuleId {
                    id: rule.id.clone(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "multi-stage",
            "build uses more than one stage so toolchains stay out of the shipped image",
            Severity::Error,
            RuleCheck::MultiStage,
        ),
        Rule::new(
            "minimal-base",
            "final stage starts from a minimal base image (scratch, alpine, distroless, slim)",
            Severity::Warn,
            RuleCheck::MinimalBase,
        ),
        Rule::new(
            "no-docs-in-final-stage",
            "final stage copies no documentation files (*.md, README*, LICENSE*, docs/)",
            Severity::Warn,
            RuleCheck::NoDocsInFinalStage,
        ),
        Rule::new(
            "pinned-base-tag",
            "every base image pins an explicit tag instead of floating on latest",
            Severity::Warn,
            RuleCheck::PinnedBaseTag,
        ),
        Rule::new(
            "clean-package-cache",
            "package-manager installs clean their caches in the same command",
            Severity::Warn,
            RuleCheck::CleanPackageCache,
        ),
        Rule::new(
            "no-build-tools-in-final",
            "final stage runs no compilers or package installs",
            Severity::Warn,
            RuleCheck::NoBuildToolsInFinal,
        ),
        Rule::new(
            "artifact-copy-into-final",
            "final stage of a multi-stage build copies built artifacts from an earlier stage",
            Severity::Info,
            RuleCheck::ArtifactCopyIntoFinal,
        ),
    ]
}
