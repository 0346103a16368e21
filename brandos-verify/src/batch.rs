//! Batch verification module
//!
//! Validates every discovered workflow document in parallel and collects a
//! per-document result plus the aggregate pass/fail counts. Documents are
//! independent: a malformed or unreadable file only affects its own result.

use crate::discovery::DiscoveryService;
use brandos_libs::{AppError, ValidationFailure, ValidationOutcome, WorkflowValidator};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Final state of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Parsed and structurally valid
    Valid,

    /// Parsed, with one or more validation failures
    Invalid,

    /// Could not be parsed into the workflow shape
    Malformed,

    /// Could not be read from disk
    Unreadable,
}

/// Result of checking one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentResult {
    /// Path relative to the scanned root
    pub path: String,

    pub status: DocumentStatus,

    /// Typed validation failures (only for `Invalid`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ValidationFailure>,

    /// Parse or IO error text (only for `Malformed` / `Unreadable`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentResult {
    fn checked(path: String, outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid => Self {
                path,
                status: DocumentStatus::Valid,
                failures: Vec::new(),
                error: None,
            },
            ValidationOutcome::Invalid(failures) => Self {
                path,
                status: DocumentStatus::Invalid,
                failures,
                error: None,
            },
        }
    }

    fn with_error(path: String, status: DocumentStatus, error: String) -> Self {
        Self {
            path,
            status,
            failures: Vec::new(),
            error: Some(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == DocumentStatus::Valid
    }

    /// Human-readable reason for a failing document
    pub fn message(&self) -> String {
        match self.status {
            DocumentStatus::Valid => String::new(),
            DocumentStatus::Invalid => self
                .failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            DocumentStatus::Malformed => format!(
                "Malformed document: {}",
                self.error.as_deref().unwrap_or_default()
            ),
            DocumentStatus::Unreadable => format!(
                "Unreadable document: {}",
                self.error.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Aggregate report of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-document results, in path order
    pub results: Vec<DocumentResult>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn from_results(results: Vec<DocumentResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed()).count();

        Self {
            results,
            total,
            passed,
            failed: total - passed,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// One `[FAIL] <path>: <reason>` line per failing document
    pub fn failure_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| format!("[FAIL] {}: {}", r.path, r.message()))
            .collect()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}/{} passed, {} failed.",
            self.passed, self.total, self.failed
        )
    }

    /// Failure lines followed by the summary line
    pub fn render_text(&self) -> String {
        let mut lines = self.failure_lines();
        lines.push(self.summary_line());
        lines.join("\n")
    }
}

/// Runs a validator over every document a discovery service finds
pub struct BatchRunner {
    validator: WorkflowValidator,
    /// Maximum documents checked at once
    jobs: usize,
}

impl BatchRunner {
    pub fn new(validator: WorkflowValidator, jobs: usize) -> Self {
        Self {
            validator,
            jobs: jobs.max(1),
        }
    }

    /// Discover and validate all documents
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - Every discovered document has a result
    /// * `Err(AppError)` - Discovery itself failed (e.g. missing root)
    pub async fn run(&self, discovery: &DiscoveryService) -> Result<BatchReport, AppError> {
        let paths = discovery.discover_documents()?;
        info!(
            "Validating {} documents under {:?} ({} jobs)",
            paths.len(),
            discovery.root(),
            self.jobs
        );

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let location = discovery.relative_path(&path);
            let validator = self.validator.clone();
            let semaphore = Arc::clone(&semaphore);
            let task_location = location.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                check_document(&validator, &path, task_location).await
            });

            handles.push((location, handle));
        }

        // Awaited in path order so the report is deterministic
        let mut results = Vec::with_capacity(handles.len());
        for (location, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("Validation task for {} failed: {}", location, e);
                    results.push(DocumentResult::with_error(
                        location,
                        DocumentStatus::Unreadable,
                        format!("validation task failed: {}", e),
                    ));
                }
            }
        }

        let report = BatchReport::from_results(results);
        info!("{}", report.summary_line());
        Ok(report)
    }
}

/// Read, parse and validate a single document
async fn check_document(
    validator: &WorkflowValidator,
    path: &Path,
    location: String,
) -> DocumentResult {
    match read_and_validate(validator, path, &location).await {
        Ok(outcome) => DocumentResult::checked(location, outcome),
        Err(AppError::IoError(e)) => {
            warn!("Failed to read {:?}: {}", path, e);
            DocumentResult::with_error(location, DocumentStatus::Unreadable, e.to_string())
        }
        Err(AppError::MalformedDocument { message, .. }) => {
            DocumentResult::with_error(location, DocumentStatus::Malformed, message)
        }
        Err(e) => DocumentResult::with_error(location, DocumentStatus::Malformed, e.to_string()),
    }
}

/// Raw bytes are parsed as-is, so non-UTF-8 content is malformed, not unreadable
async fn read_and_validate(
    validator: &WorkflowValidator,
    path: &Path,
    location: &str,
) -> Result<ValidationOutcome, AppError> {
    let bytes = tokio::fs::read(path).await?;
    validator.validate_slice(&bytes, location)
}
