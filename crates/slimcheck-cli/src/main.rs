//! slimcheck - container image build-policy advisor
//!
//! The `slimcheck` command evaluates a multi-stage build description
//! against the builtin size-optimization rule catalog.
//!
//! ## Commands
//!
//! - `advise`: evaluate a build description and report findings
//! - `rules`: list the builtin rule catalog

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use slimcheck_core::{
    evaluate, parse, render_json, render_text, BuildSpec, RuleCatalog,
};

#[derive(Parser)]
#[command(name = "slimcheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Container image build-policy advisor", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for reports and rule listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a build description against the rule catalog
    Advise {
        /// Path to the build description file
        path: PathBuf,

        /// Report output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the builtin rule catalog
    Rules {
        /// Listing output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    slimcheck_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Advise { path, format } => cmd_advise(&path, format),
        Commands::Rules { format } => cmd_rules(format),
    }
}

/// Evaluate a build description and print the report.
///
/// Exits non-zero when the policy gate fails or the input cannot be
/// parsed.
fn cmd_advise(path: &Path, format: OutputFormat) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read build description: {:?}", path))?;

    let spec = load_spec(&raw, path)?;
    slimcheck_core::obs::emit_spec_parsed(spec.stages.len(), &spec.stages_digest());

    let catalog = RuleCatalog::load().context("Failed to load rule catalog")?;
    let report = evaluate(&spec, &catalog);

    match format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }

    info!(
        overall_passed = report.overall_passed,
        failed = report.failed_count(),
        "advise complete"
    );

    if report.overall_passed {
        Ok(())
    } else {
        anyhow::bail!("build-policy gate failed")
    }
}

fn load_spec(raw: &str, path: &Path) -> Result<BuildSpec> {
    parse(raw).with_context(|| format!("Failed to parse build description: {:?}", path))
}

/// List the builtin rule catalog.
fn cmd_rules(format: OutputFormat) -> Result<()> {
    let catalog = RuleCatalog::load().context("Failed to load rule catalog")?;

    match format {
        OutputFormat::Text => {
            for rule in catalog.iter() {
                println!(
                    "[{}] {}: {}",
                    rule.severity.label(),
                    rule.id,
                    rule.description
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
    }

    Ok(())
}
