//! Error types for the Famlink engine.
//!
//! Local storage corruption is deliberately absent here: malformed
//! persisted JSON is recovered in place (logged, treated as the empty
//! default) and never propagated to callers.

use thiserror::Error;

/// All possible errors from the Famlink engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A remote gateway call failed (network or validation error from
    /// the hosted database service).
    #[error("remote call on '{table}' failed: {message}")]
    Gateway { table: String, message: String },

    /// A parent-row insert did not return the generated identifier.
    #[error("insert into '{table}' returned no generated identifier")]
    MissingInsertId { table: String },

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a gateway failure on a table.
    pub fn gateway(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Gateway {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
