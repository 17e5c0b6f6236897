//! Build-spec model, structural parser, and canonical serializer.
//!
//! The input format is a minimal FROM-delimited structural model, not a
//! full Dockerfile dialect: `FROM <image> [AS <name>]` opens a stage,
//! `COPY [flags] <source>... <dest>` and `RUN <command>` append to it,
//! `#` comments and blank lines are ignored. The last stage is the final
//! (shipped) stage.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ParseError;
use crate::stage::{CopyStep, Stage};

/// A parsed multi-stage build description.
///
/// Stages are ordered and exactly one stage — the last — is final. The
/// advisor engine only reads the spec; construction and ownership stay
/// with the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildSpec {
    /// Build stages, in declaration order.
    pub stages: Vec<Stage>,
}

impl BuildSpec {
    /// Build a spec from pre-constructed stages.
    ///
    /// # Errors
    ///
    /// - `ParseError::NoStages` — the stage list is empty.
    /// - `ParseError::FinalStageCount` — not exactly one final stage.
    /// - `ParseError::FinalStageNotLast` — a non-last stage is final.
    pub fn from_stages(stages: Vec<Stage>) -> Result<Self, ParseError> {
        if stages.is_empty() {
            return Err(ParseError::NoStages);
        }

        let finals = stages.iter().filter(|s| s.is_final).count();
        if finals != 1 {
            return Err(ParseError::FinalStageCount { count: finals });
        }

        if let Some(last) = stages.last() {
            if !last.is_final {
                return Err(ParseError::FinalStageNotLast);
            }
        }

        Ok(Self { stages })
    }

    /// The final (shipped) stage, when the one-final invariant holds.
    ///
    /// Returns `None` for specs that bypassed [`BuildSpec::from_stages`]
    /// (e.g. hand-deserialized input) and broke the invariant.
    pub fn final_stage(&self) -> Option<&Stage> {
        self.stages.iter().find(|s| s.is_final)
    }

    /// Look up a stage by name.
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Deterministic SHA-256 digest over ordered stage names and base images.
    ///
    /// Stable across invocations for the same spec; used to correlate log
    /// lines and CI artifacts with the spec they describe.
    pub fn stages_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for stage in &self.stages {
            hasher.update(stage.name.as_bytes());
            hasher.update(b"\0");
            hasher.update(stage.base_image.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }
}

/// Parse a build description into a [`BuildSpec`].
///
/// Instruction keywords are case-insensitive. Unnamed stages get their
/// zero-based index as name. `COPY` flags (tokens starting with `--`) are
/// ignored; each remaining source token yields one [`CopyStep`] to the
/// final destination token.
///
/// # Errors
///
/// - `ParseError::NoStages` — no `FROM` line, so no final stage exists.
/// - `ParseError::EmptyBaseImage` — `FROM` with no image reference.
/// - `ParseError::MalformedFrom` — tokens after the image that are not
///   `AS <name>`.
/// - `ParseError::InstructionOutsideStage` — `COPY`/`RUN` before `FROM`.
/// - `ParseError::DuplicateStageName` — two stages share a name.
/// - `ParseError::MalformedCopy` — `COPY` with fewer than two operands.
/// - `ParseError::UnknownInstruction` — any other leading keyword.
pub fn parse(raw: &str) -> Result<BuildSpec, ParseError> {
    let mut stages: Vec<Stage> = Vec::new();

    for (idx, raw_line) in raw.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((kw, rest)) => (kw, rest.trim()),
            None => (trimmed, ""),
        };

        match keyword.to_ascii_uppercase().as_str() {
            "FROM" => parse_from(&mut stages, rest, line)?,
            "COPY" => parse_copy(&mut stages, rest, line)?,
            "RUN" => parse_run(&mut stages, rest, line)?,
            _ => {
                return Err(ParseError::UnknownInstruction {
                    line,
                    instruction: keyword.to_string(),
                });
            }
        }
    }

    match stages.last_mut() {
        Some(last) => last.is_final = true,
        None => return Err(ParseError::NoStages),
    }

    Ok(BuildSpec { stages })
}

/// Render a spec back to the structural format.
///
/// Canonical form: every stage gets an explicit `AS` name and every copy
/// step its own `COPY` line, so `parse` of the output reproduces the
/// input model exactly.
pub fn serialize(spec: &BuildSpec) -> String {
    let mut out = String::new();
    for stage in &spec.stages {
        out.push_str(&format!("FROM {} AS {}\n", stage.base_image, stage.name));
        for copy in &stage.copied_paths {
            out.push_str(&format!("COPY {} {}\n", copy.source, copy.dest));
        }
        for command in &stage.commands {
            out.push_str(&format!("RUN {}\n", command));
        }
    }
    out
}

fn parse_from(stages: &mut Vec<Stage>, rest: &str, line: usize) -> Result<(), ParseError> {
    let mut tokens = rest.split_whitespace();

    let image = match tokens.next() {
        Some(image) => image,
        None => return Err(ParseError::EmptyBaseImage { line }),
    };

    let name = match (tokens.next(), tokens.next(), tokens.next()) {
        (None, _, _) => stages.len().to_string(),
        (Some(kw), Some(name), None) if kw.eq_ignore_ascii_case("as") => name.to_string(),
        _ => return Err(ParseError::MalformedFrom { line }),
    };

    if stages.iter().any(|s| s.name == name) {
        return Err(ParseError::DuplicateStageName { line, name });
    }

    stages.push(Stage::new(name, image));
    Ok(())
}

fn parse_copy(stages: &mut [Stage], rest: &str, line: usize) -> Result<(), ParseError> {
    let current = match stages.last_mut() {
        Some(stage) => stage,
        None => {
            return Err(ParseError::InstructionOutsideStage {
                line,
                instruction: "COPY".to_string(),
            });
        }
    };

    let operands: Vec<&str> = rest
        .split_whitespace()
        .filter(|token| !token.starts_with("--"))
        .collect();

    match operands.split_last() {
        Some((dest, sources)) if !sources.is_empty() => {
            for source in sources {
                current.copied_paths.push(CopyStep::new(*source, *dest));
            }
            Ok(())
        }
        _ => Err(ParseError::MalformedCopy { line }),
    }
}

fn parse_run(stages: &mut [Stage], rest: &str, line: usize) -> Result<(), ParseError> {
    let current = match stages.last_mut() {
        Some(stage) => stage,
        None => {
            return Err(ParseError::InstructionOutsideStage {
                line,
                instruction: "RUN".to_string(),
            });
        }
    };

    // RUN with no command is a no-op in the structural model.
    if !rest.is_empty() {
        current.commands.push(rest.to_string());
    }
    Ok(())
}
