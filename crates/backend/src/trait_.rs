//! Backend adapter trait.

use async_trait::async_trait;
use buildwatch_core::{
    BuildRef, BuildSnapshot, Change, Feature, Investigation, TargetHandle, TargetId,
};
use std::time::Duration;

/// Error type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while talking to a backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Network, authentication or protocol failure
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish in time
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The backend does not know this build
    #[error("unknown build: {0}")]
    UnknownBuild(String),

    /// The backend does not know this target
    #[error("unknown target: {0}")]
    UnknownTarget(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Capability contract of one CI backend.
///
/// Implemented once per CI system. The engine only ever sees the normalized
/// snapshot types; raw payload shapes stay behind the adapter.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Endpoint this adapter talks to.
    fn endpoint(&self) -> &str;

    /// Whether targets of `feature` live on this backend.
    fn can_speak_for(&self, feature: &Feature) -> bool {
        feature.endpoint.trim_end_matches('/') == self.endpoint().trim_end_matches('/')
    }

    // === Target state ===

    /// Whether the target is paused.
    async fn is_paused(&self, target: &TargetHandle) -> Result<bool>;

    /// Builds of the target currently executing.
    async fn running_builds(&self, target: &TargetHandle) -> Result<Vec<BuildRef>>;

    /// Most recent finished build of the target.
    async fn last_completed_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>>;

    /// Most recent successful build of the target.
    async fn last_successful_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>>;

    /// Investigations of the target, most recent first.
    async fn investigations(&self, target: &TargetHandle) -> Result<Vec<Investigation>>;

    // === Builds ===

    /// Full snapshot of a build.
    async fn build_detail(&self, build: &BuildRef) -> Result<BuildSnapshot>;

    /// Changes that went into a build.
    ///
    /// Adapters whose snapshots already carry their changes can rely on the
    /// default.
    async fn changes_of(&self, build: &BuildSnapshot) -> Result<Vec<Change>> {
        Ok(build.changes.clone())
    }

    /// Post a comment on a build.
    async fn post_comment(&self, build: &BuildRef, text: &str) -> Result<()>;

    // === Enumeration ===

    /// Targets constituting a feature.
    async fn enumerate_targets(&self, feature: &Feature) -> Result<Vec<(TargetId, TargetHandle)>>;
}
