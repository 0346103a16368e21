//! # Brand OS Verify - Workflow Checker
//!
//! Batch verifier for saved workflow documents. Meant to run in CI or as a
//! pre-commit step over the directory the canvas exports workflows to.
//!
//! ## Flow
//!
//! 1. Loads the registry declaration (`--registry` or the built-in one)
//! 2. Recursively discovers `*.json` files below the root
//! 3. Validates them in parallel against the port type registry
//! 4. Prints one `[FAIL]` line per failing document and a summary line
//! 5. Exits with a non-zero status when anything failed

mod batch;
mod discovery;

use anyhow::{Context, Result};
use brandos_libs::{load_registry_config, RegistryConfig, WorkflowValidator};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use batch::{BatchReport, BatchRunner};
use discovery::{DiscoveryService, DEFAULT_EXCLUDES};

/// Output format for the report written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// `[FAIL]` lines and a summary line
    Text,
    /// A single JSON report with typed failures
    Json,
}

/// Validate Brand OS workflow documents
#[derive(Debug, Parser)]
#[command(name = "brandos-verify", version, about)]
struct Cli {
    /// Directory to scan for workflow documents
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Registry declaration (YAML); the built-in declaration is used when omitted
    #[arg(long, env = "BRANDOS_REGISTRY")]
    registry: Option<PathBuf>,

    /// Maximum number of documents validated at once
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Directory names to skip while scanning
    #[arg(long = "exclude", default_values = DEFAULT_EXCLUDES)]
    excludes: Vec<String>,
}

/// Exit status when every document passed
const EXIT_PASSED: u8 = 0;
/// Exit status when at least one document failed
const EXIT_FAILED: u8 = 1;
/// Exit status for configuration or usage problems
const EXIT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandos_verify=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(e) = &result {
        error!("Verification aborted: {:#}", e);
        eprintln!("Error: {:#}", e);
    }

    ExitCode::from(exit_code(&result))
}

/// Map the outcome of a run to the process exit status
fn exit_code(result: &Result<BatchReport>) -> u8 {
    match result {
        Ok(report) if report.has_failures() => EXIT_FAILED,
        Ok(_) => EXIT_PASSED,
        Err(_) => EXIT_ERROR,
    }
}

async fn run(cli: Cli) -> Result<BatchReport> {
    let config = match &cli.registry {
        Some(path) => load_registry_config(path)
            .with_context(|| format!("failed to load registry {:?}", path))?,
        None => RegistryConfig::builtin(),
    };

    let validator =
        WorkflowValidator::from_config(&config).context("inconsistent registry declaration")?;
    info!(
        "Registry ready: {} port types, {} catalog nodes",
        validator.ports().len(),
        validator.catalog().len()
    );

    let jobs = cli.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    let discovery = DiscoveryService::new(&cli.root, cli.excludes);
    let report = BatchRunner::new(validator, jobs)
        .run(&discovery)
        .await
        .with_context(|| format!("failed to scan {:?}", cli.root))?;

    match cli.format {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize report")?
        ),
    }

    Ok(report)
}
