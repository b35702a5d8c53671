//! Error types for the suggest library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SuggestError`] enum. Indexing entry points only return `Err` for
//! configuration faults; failures of individual inputs are collected into the
//! [`IndexResponse`](crate::indexer::status::IndexResponse) instead.
//!
//! # Examples
//!
//! ```
//! use sarissa_suggest::error::{Result, SuggestError};
//!
//! fn check_boost(boost: f32) -> Result<()> {
//!     if boost < 0.0 {
//!         return Err(SuggestError::invalid_argument("boost must not be negative"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_boost(-1.0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for suggest operations.
#[derive(Error, Debug)]
pub enum SuggestError {
    /// I/O errors (settings files, config files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single malformed input entry (document, query log, query string).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backing store read or write failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Missing or inconsistent configuration. Raised before any work starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Settings store failures.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Store query syntax errors.
    #[error("Query error: {0}")]
    Query(String),

    /// Worker pool or queue failures during an indexing run.
    #[error("Indexing error: {0}")]
    Indexing(String),

    /// Analyzer failures.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid argument passed by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with SuggestError.
pub type Result<T> = std::result::Result<T, SuggestError>;

impl SuggestError {
    /// Create a new input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        SuggestError::InvalidInput(msg.into())
    }

    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        SuggestError::Store(msg.into())
    }

    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        SuggestError::Configuration(msg.into())
    }

    /// Create a new settings error.
    pub fn settings<S: Into<String>>(msg: S) -> Self {
        SuggestError::Settings(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SuggestError::Query(msg.into())
    }

    /// Create a new indexing error.
    pub fn indexing<S: Into<String>>(msg: S) -> Self {
        SuggestError::Indexing(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SuggestError::Analysis(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SuggestError::InvalidArgument(msg.into())
    }

    /// Short machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestError::Io(_) => "io",
            SuggestError::InvalidInput(_) => "invalid_input",
            SuggestError::Store(_) => "store",
            SuggestError::Configuration(_) => "configuration",
            SuggestError::Settings(_) => "settings",
            SuggestError::Query(_) => "query",
            SuggestError::Indexing(_) => "indexing",
            SuggestError::Analysis(_) => "analysis",
            SuggestError::InvalidArgument(_) => "invalid_argument",
            SuggestError::Json(_) => "json",
        }
    }
}
