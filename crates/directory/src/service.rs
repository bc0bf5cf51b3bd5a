//! Offender directory trait.

use async_trait::async_trait;
use buildwatch_core::Sponsor;
use std::collections::BTreeSet;

/// Error type for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Errors that can occur while searching or loading the directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory could not be consulted
    #[error("offender directory unavailable: {0}")]
    Unavailable(String),

    /// An identity or alias could not be turned into a matcher
    #[error("invalid offender pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lookup service mapping free text to known sponsors.
#[async_trait]
pub trait OffenderDirectory: Send + Sync {
    /// Sponsors whose identity appears in `text`.
    async fn search(&self, text: &str) -> Result<BTreeSet<Sponsor>>;
}
