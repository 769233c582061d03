//! Error types for callforge
//!
//! Per-call failures during an execution check are never errors: they are
//! recorded as outcomes in the report. Everything here is a failure of the
//! run itself or of one of its collaborators.

use thiserror::Error;

/// Main error type for dataset generation and execution checking
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Worker pool could not schedule or complete a task
    #[error("Execution infrastructure failure: {0}")]
    Infrastructure(String),

    /// LLM completion endpoint errors
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Dataset hub errors
    #[error("Hub error: {0}")]
    Hub(String),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Convert anyhow errors to DatasetError
impl From<anyhow::Error> for DatasetError {
    fn from(err: anyhow::Error) -> Self {
        DatasetError::Generic(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::Timeout { duration_ms: 1500 };
        assert!(err.to_string().contains("1500"));
    }

    #[test]
    fn test_infrastructure_error_is_distinct() {
        let err = DatasetError::Infrastructure("semaphore closed".to_string());
        assert!(matches!(err, DatasetError::Infrastructure(_)));
        assert!(err.to_string().contains("semaphore closed"));
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err = anyhow::anyhow!("root cause").context("loading dataset");
        let converted: DatasetError = err.into();
        let text = converted.to_string();
        assert!(text.contains("loading dataset"));
        assert!(text.contains("root cause"));
    }
}
