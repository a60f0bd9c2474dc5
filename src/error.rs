//! Scanner error types

use serde::Serialize;
use thiserror::Error;

/// Scan-wide error type
///
/// Every variant that reaches the top-level caller aborts the whole scan.
/// Per-ticker problems are absorbed into the data instead (see
/// [`crate::services::drawdown_service::DrawdownOutcome`]).
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Insufficient data for {symbol}: need {required} closes, got {available}")]
    InsufficientData {
        symbol: String,
        required: usize,
        available: usize,
    },

    #[error("No data returned for {0}")]
    NoData(String),

    #[error("Missing gateway credential: set {0}")]
    MissingCredential(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error response for the HTTP trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&ScanError> for ErrorResponse {
    fn from(err: &ScanError) -> Self {
        let code = match err {
            ScanError::Serialization(_) => "SERIALIZATION_ERROR",
            ScanError::Http(_) => "HTTP_ERROR",
            ScanError::InsufficientData { .. } => "INSUFFICIENT_DATA",
            ScanError::NoData(_) => "NO_DATA",
            ScanError::MissingCredential(_) => "MISSING_CREDENTIAL",
            ScanError::Gateway(_) => "GATEWAY_ERROR",
            ScanError::Config(_) => "CONFIG_ERROR",
            ScanError::Validation(_) => "VALIDATION_ERROR",
            ScanError::Io(_) => "IO_ERROR",
            ScanError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<ScanError> for ErrorResponse {
    fn from(err: ScanError) -> Self {
        ErrorResponse::from(&err)
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
