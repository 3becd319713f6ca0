//! Error types for the dataset preparation pipelines.
//!
//! Validation problems (bad labels, duplicate ids, malformed dates) are never
//! errors: they are accumulated as report findings. The variants here cover
//! the fatal cases only: unreadable input, infeasible splits, failed writes.

use thiserror::Error;

/// The main error type for dataset preparation and the classification flow.
#[derive(Error, Debug)]
pub enum PrepError {
    /// A column the operation cannot run without is absent.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigValidationError),

    /// The requested stratified split cannot be produced.
    #[error("Stratified split infeasible: {0}")]
    SplitInfeasible(String),

    /// Input text was empty after trimming.
    #[error("Input text is empty")]
    EmptyText,

    /// The classifier returned a probability vector the label mapping
    /// cannot index into.
    #[error("Probability vector of length {len} does not cover label index {index}")]
    BadProbabilityVector { len: usize, index: usize },

    /// Classifier failed to load or predict.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_keeps_source_message() {
        let err = PrepError::ColumnNotFound("label".to_string())
            .with_context("While splitting dataset");
        let msg = err.to_string();
        assert!(msg.contains("While splitting dataset"));
        assert!(msg.contains("label"));
    }

    #[test]
    fn test_result_ext_on_io() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.context("Reading report").unwrap_err();
        assert!(err.to_string().contains("Reading report"));
    }
}
