//! Error types for RecipeBox
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::Status;

/// Result type alias using RecipeError
pub type Result<T> = std::result::Result<T, RecipeError>;

/// Unified error type for RecipeBox operations
#[derive(Debug, Error)]
pub enum RecipeError {
    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    /// Fatal: the store could not create, bootstrap, or load its index
    #[error("Initialization failed: {0}")]
    Initialization(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid id '{0}': must match [a-z0-9-], be 1-255 characters, and not be 'index'")]
    InvalidIdentifier(String),

    #[error("Item does not exist: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Corruption Errors
    // -------------------------------------------------------------------------
    #[error("Index is corrupt: {0}")]
    CorruptIndex(#[source] serde_json::Error),

    #[error("Record '{id}' is corrupt: {source}")]
    CorruptRecord {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecipeError {
    /// Response status a request boundary should report for this error
    ///
    /// - not found            → 404
    /// - caller-side mistakes → 400
    /// - everything else      → 500
    pub fn status(&self) -> Status {
        match self {
            RecipeError::NotFound(_) => Status::NotFound,
            RecipeError::InvalidIdentifier(_) | RecipeError::Protocol(_) => Status::BadRequest,
            _ => Status::Error,
        }
    }

    /// True for errors that leave the store unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecipeError::Initialization(_))
    }
}
