//! Aggregate target status.

use serde::{Deserialize, Serialize};

/// Status of a target at one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Nothing reliable is known
    #[default]
    Unknown,
    /// Last relevant build passed
    Green,
    /// Last relevant build failed
    Broken,
    /// Target is paused on the backend
    Disabled,
    /// Broken, but someone has claimed the breakage
    UnderInvestigation,
}

impl Status {
    /// Whether this status implicates sponsors.
    pub fn carries_blame(self) -> bool {
        matches!(self, Status::Broken | Status::UnderInvestigation)
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unknown => "unknown",
            Status::Green => "green",
            Status::Broken => "broken",
            Status::Disabled => "disabled",
            Status::UnderInvestigation => "under_investigation",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
