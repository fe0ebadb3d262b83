//! Error types for schema-driven argument parsing.

use thiserror::Error;

/// Errors raised while building a parser from a schema.
///
/// Validation failures are not represented here: a failed `parse` is an
/// expected outcome and is returned as a [`crate::ValidationFailure`] value.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The schema was rejected by the validation engine at compile time
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

/// Result type alias for parser construction
pub type Result<T> = std::result::Result<T, Error>;
