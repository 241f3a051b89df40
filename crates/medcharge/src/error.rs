//! Error types shared by every stage of the pipeline.
//!
//! All failures are terminal for the current request. The memoization layer
//! never caches an error, so the next call simply starts over.

use thiserror::Error;

use crate::model::ConfigError;

// =============================================================================
// ChargeError
// =============================================================================

/// Errors produced while loading data, training, or estimating a charge.
#[derive(Debug, Clone, Error)]
pub enum ChargeError {
    /// The dataset location does not resolve to readable tabular data.
    #[error("dataset '{location}' not found; place it at the configured location ({reason})")]
    NotFound { location: String, reason: String },

    /// The dataset violates the expected schema or category sets.
    #[error("malformed dataset: {}", format_malformed(.row, .column, .reason))]
    MalformedData {
        /// 1-based data row (header excluded), if the problem is row-specific.
        row: Option<usize>,
        column: String,
        reason: String,
    },

    /// The training partition cannot be fitted.
    #[error("training failed: {0}")]
    Training(String),

    /// A prediction request field lies outside its declared domain.
    #[error("invalid input: {field} = {value} is outside {domain}")]
    InvalidInput {
        field: &'static str,
        value: String,
        domain: &'static str,
    },

    /// Inference was requested before any model was trained.
    #[error("model not ready: train a model before requesting an estimate")]
    ModelNotReady,

    /// Configuration rejected at build time.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

fn format_malformed(row: &Option<usize>, column: &str, reason: &str) -> String {
    match row {
        Some(row) => format!("row {row}, column '{column}': {reason}"),
        None => format!("column '{column}': {reason}"),
    }
}

impl ChargeError {
    /// Schema-level problem not tied to a single row.
    pub(crate) fn malformed_column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            row: None,
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Cell-level problem at a 1-based data row.
    pub(crate) fn malformed_cell(
        row: usize,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedData {
            row: Some(row),
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ChargeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_includes_row_and_column() {
        let err = ChargeError::malformed_cell(3, "smoker", "unknown category 'maybe'");
        assert_eq!(
            err.to_string(),
            "malformed dataset: row 3, column 'smoker': unknown category 'maybe'"
        );
    }

    #[test]
    fn malformed_message_without_row() {
        let err = ChargeError::malformed_column("charges", "required column is missing");
        assert_eq!(
            err.to_string(),
            "malformed dataset: column 'charges': required column is missing"
        );
    }

    #[test]
    fn invalid_input_message_names_domain() {
        let err = ChargeError::InvalidInput {
            field: "age",
            value: "81".into(),
            domain: "[5, 80]",
        };
        assert_eq!(err.to_string(), "invalid input: age = 81 is outside [5, 80]");
    }
}
