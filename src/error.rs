//! Error types for the Vecina library.
//!
//! All failures are represented by the [`VecinaError`] enum. The three
//! conditions callers are expected to match on are [`VecinaError::NotFound`]
//! (a lookup key resolved to no document), [`VecinaError::InvalidRange`]
//! (rescaling requested against a batch that yields no source range) and
//! [`VecinaError::MalformedInput`] (rejected before any request is built).
//!
//! # Examples
//!
//! ```
//! use vecina::error::{Result, VecinaError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(VecinaError::malformed_input("query vector is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Vecina operations.
#[derive(Error, Debug)]
pub enum VecinaError {
    /// A field/value lookup matched no indexed document.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A source range for rescaling could not be derived.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Caller input rejected before query construction.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The external search engine reported a failure.
    #[error("Engine error: {0}")]
    Engine(String),

    /// The engine response was missing an expected field or had the wrong shape.
    #[error("Response error: {0}")]
    Response(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors (reading vector files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with VecinaError.
pub type Result<T> = std::result::Result<T, VecinaError>;

impl VecinaError {
    /// Create a new not-found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        VecinaError::NotFound(msg.into())
    }

    /// Create a new invalid-range error.
    pub fn invalid_range<S: Into<String>>(msg: S) -> Self {
        VecinaError::InvalidRange(msg.into())
    }

    /// Create a new malformed-input error.
    pub fn malformed_input<S: Into<String>>(msg: S) -> Self {
        VecinaError::MalformedInput(msg.into())
    }

    /// Create a new engine error.
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        VecinaError::Engine(msg.into())
    }

    /// Create a new response-shape error.
    pub fn response<S: Into<String>>(msg: S) -> Self {
        VecinaError::Response(msg.into())
    }
}
