//! Engine error taxonomy.

use buildwatch_backend::BackendError;
use buildwatch_core::TargetId;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised inside the engine.
///
/// Only [`EngineError::NotFound`] reaches callers; the other kinds are turned
/// into degraded results at the resolver and attributor boundaries.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Network, timeout or parse failure from the backend adapter
    #[error("{0}")]
    BackendUnavailable(#[from] BackendError),

    /// The target id was never registered in the catalog
    #[error("target not registered: {0}")]
    NotFound(TargetId),

    /// The offender directory could not be searched
    #[error("attribution unavailable: {0}")]
    AttributionUnavailable(String),
}

impl EngineError {
    /// Whether this is a catalog miss rather than a backend problem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}
