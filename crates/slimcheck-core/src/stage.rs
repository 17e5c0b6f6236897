//! Build stages and their copied paths.

use serde::{Deserialize, Serialize};

/// One copied path within a stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CopyStep {
    /// Source path in the build context or an earlier stage.
    pub source: String,

    /// Destination path inside the stage filesystem.
    pub dest: String,
}

impl CopyStep {
    /// Create a new copy step.
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

/// One FROM-delimited phase of a multi-stage build description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    /// Stage name (explicit `AS` name, or the stage index as a string).
    pub name: String,

    /// Base image reference the stage starts from.
    pub base_image: String,

    /// Whether this is the final (shipped) stage.
    pub is_final: bool,

    /// Copied paths, in order.
    pub copied_paths: Vec<CopyStep>,

    /// Executed commands, in order.
    pub commands: Vec<String>,
}

impl Stage {
    /// Create a new non-final stage with no copies or commands.
    pub fn new(name: impl Into<String>, base_image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_image: base_image.into(),
            is_final: false,
            copied_paths: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Mark this stage as the final stage.
    pub fn finalized(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Append a copied path.
    pub fn with_copy(mut self, source: impl Into<String>, dest: impl Into<String>) -> Self {
        self.copied_paths.push(CopyStep::new(source, dest));
        self
    }

    /// Append a command.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Base image repository without tag or digest.
    ///
    /// `registry:5000/app:v1` -> `registry:5000/app`, `alpine:3.20` -> `alpine`.
    pub fn base_repository(&self) -> &str {
        let reference = strip_digest(&self.base_image);
        match tag_separator(reference) {
            Some(idx) => &reference[..idx],
            None => reference,
        }
    }

    /// Explicit base image tag, if one is present.
    pub fn base_tag(&self) -> Option<&str> {
        let reference = strip_digest(&self.base_image);
        tag_separator(reference).map(|idx| &reference[idx + 1..])
    }

    /// Whether the base image is pinned by digest (`@sha256:...`).
    pub fn base_is_digest_pinned(&self) -> bool {
        self.base_image.contains('@')
    }
}

fn strip_digest(reference: &str) -> &str {
    match reference.split_once('@') {
        Some((name, _)) => name,
        None => reference,
    }
}

/// Byte index of the tag-separating `:`, ignoring registry port colons.
fn tag_separator(reference: &str) -> Option<usize> {
    match reference.rfind(':') {
        Some(idx) if !reference[idx + 1..].contains('/') => Some(idx),
        _ => None,
    }
}
