//! Build snapshots as read from a backend adapter.

use crate::{Percentage, Status, Time};
use serde::{Deserialize, Serialize};

/// Listing-level reference to a build.
///
/// Carries the status the backend reported when listing the build, which may
/// be less precise than the status in the build's detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildRef {
    /// Backend build id
    pub id: String,

    /// Status as reported in the listing
    #[serde(default)]
    pub status: Status,
}

impl BuildRef {
    /// Create a new build reference.
    pub fn new(id: impl Into<String>, status: Status) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Immutable snapshot of one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    /// Backend build id
    pub id: String,

    /// When the build started
    pub start_time: Time,

    /// Status of the build
    pub status: Status,

    /// Duration in milliseconds, once completed
    #[serde(default)]
    pub duration_ms: Option<i64>,

    /// Completion the backend reports itself, if it does
    #[serde(default)]
    pub reported_percent: Option<Percentage>,

    /// Changes that went into this build, oldest first
    #[serde(default)]
    pub changes: Vec<Change>,

    /// Upstream builds that caused this one
    #[serde(default)]
    pub upstream: Vec<BuildRef>,

    /// Full names of the users the backend blames for this build
    #[serde(default)]
    pub culprits: Vec<String>,
}

impl BuildSnapshot {
    /// Create a snapshot with no changes and no upstream causes.
    pub fn new(id: impl Into<String>, start_time: Time, status: Status) -> Self {
        Self {
            id: id.into(),
            start_time,
            status,
            duration_ms: None,
            reported_percent: None,
            changes: Vec::new(),
            upstream: Vec::new(),
            culprits: Vec::new(),
        }
    }

    /// Reference to this build, carrying its detailed status.
    pub fn to_ref(&self) -> BuildRef {
        BuildRef::new(self.id.clone(), self.status)
    }

    /// Duration of the build, if completed.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.duration_ms.map(chrono::Duration::milliseconds)
    }
}

/// One change (commit) that went into a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Author identity as recorded by the VCS
    pub author: String,

    /// Commit message
    #[serde(default)]
    pub message: String,
}

impl Change {
    /// Create a new change.
    pub fn new(author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            message: message.into(),
        }
    }
}

/// One in-flight build of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBuild {
    /// How far along the build is
    pub completion: Percentage,

    /// Status the build currently reports
    pub status: Status,
}

impl RunningBuild {
    /// Create a new running build entry.
    pub fn new(completion: Percentage, status: Status) -> Self {
        Self { completion, status }
    }
}
