//! Error types for the investor flow pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the investor flow pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// No raw data was supplied to the pipeline.
    #[error("Input absent: {0}")]
    InputAbsent(String),

    /// A row is missing a field the normalizer depends on.
    #[error("Schema mismatch: row {row} is missing required field '{field}'")]
    SchemaMismatch { field: String, row: usize },

    /// A field is present but its value cannot be interpreted.
    #[error("Invalid value in row {row}, field '{field}': {value}")]
    InvalidValue {
        field: String,
        row: usize,
        value: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an input-absent error.
    pub fn input_absent(msg: impl Into<String>) -> Self {
        Error::InputAbsent(msg.into())
    }

    /// Create a schema mismatch error for the given field and row index.
    pub fn schema_mismatch(field: impl Into<String>, row: usize) -> Self {
        Error::SchemaMismatch {
            field: field.into(),
            row,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, row: usize, value: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.into(),
            row,
            value: value.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
