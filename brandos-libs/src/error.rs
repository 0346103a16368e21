//! Error types for the Brand OS workflow core.
//!
//! This module provides the error type shared by the library, the batch
//! verifier and the catalog service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Main error type for the Brand OS workflow core.
///
/// Structural graph violations are not errors: they are collected as
/// [`crate::ValidationFailure`] values. This enum covers everything that
/// prevents a check from running at all:
/// - Bad requests (a user action the catalog refuses)
/// - Lookups of unknown catalog entries
/// - Configuration errors (invalid registry declarations)
/// - Documents that cannot be parsed into the workflow shape
/// - IO failures and unparseable registry declarations
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad request error - a refused action or invalid input
    ///
    /// # Example
    /// ```
    /// use brandos_libs::AppError;
    /// let error = AppError::BadRequest("Core node 'brand-kit' cannot be uninstalled".to_string());
    /// ```
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Lookup of an entry that is not in a registry
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error - invalid or inconsistent registry declaration
    ///
    /// # Example
    /// ```
    /// use brandos_libs::AppError;
    /// let error = AppError::ConfigError("Duplicate node id 'upscaler'".to_string());
    /// ```
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The input could not be parsed into the expected node/edge shape
    ///
    /// `location` names the offending document (a relative path in batch
    /// runs, `request body` in the catalog service).
    #[error("Malformed document at {location}: {message}")]
    MalformedDocument { location: String, message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    ///
    /// Wraps serde_yaml errors for registry declaration parsing
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl AppError {
    /// Short machine-readable tag for the error category
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::ConfigError(_) => "config_error",
            AppError::MalformedDocument { .. } => "malformed_document",
            AppError::IoError(_) => "io_error",
            AppError::YamlError(_) => "yaml_error",
        }
    }
}

/// Implement Axum's IntoResponse for AppError to enable automatic HTTP error responses
///
/// Maps AppError variants to HTTP status codes:
/// - BadRequest/ConfigError/MalformedDocument -> 400 Bad Request
/// - NotFound -> 404 Not Found
/// - IoError/YamlError -> 500 Internal Server Error
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_)
            | AppError::ConfigError(_)
            | AppError::MalformedDocument { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::IoError(_) | AppError::YamlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "kind": self.kind(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
