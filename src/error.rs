//! Error types for nnga operations.
//!
//! One enum covers the whole crate: data shape problems, configuration
//! problems, search-state problems and I/O.

use thiserror::Error;

/// Main error type for nnga operations.
///
/// # Examples
///
/// ```
/// use nnga::error::NngaError;
///
/// let err = NngaError::DimensionMismatch {
///     expected: "100x10".to_string(),
///     actual: "100x5".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum NngaError {
    /// The task mode is neither regression nor classification.
    #[error(
        "'mode' attribute value {mode} is invalid! Must be either regression (regression) \
         or classification (classification)"
    )]
    InvalidMode {
        /// The offending mode, or `None` when it was never determined
        mode: String,
    },

    /// A fitted-state-gated operation was called before `fit`.
    #[error("{what} is not fitted; call fit() first")]
    NotFitted {
        /// Name of the unfitted object
        what: String,
    },

    /// Invalid hyperparameter or configuration value.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An operation needed at least one sample.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A named column is missing from a `DataFrame`.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Model training failed (diverged, non-finite loss, ...).
    #[error("Training failed: {0}")]
    Training(String),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with string message.
    #[error("{0}")]
    Other(String),
}

impl NngaError {
    /// Shorthand for [`NngaError::InvalidHyperparameter`].
    pub fn invalid_param(
        param: impl Into<String>,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.into(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    /// Shorthand for [`NngaError::NotFitted`].
    pub fn not_fitted(what: impl Into<String>) -> Self {
        Self::NotFitted { what: what.into() }
    }
}

impl From<serde_json::Error> for NngaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<&str> for NngaError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}

impl From<String> for NngaError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

/// Convenience type alias for Results with `NngaError`.
pub type Result<T> = std::result::Result<T, NngaError>;
