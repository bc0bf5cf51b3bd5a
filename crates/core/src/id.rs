//! Unique identifiers for buildwatch entities.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a monitored target.
///
/// Derived from the backend endpoint and the backend's own reference to the
/// target, so the same target keeps its id across re-enumerations within one
/// process run. Only ever used as a catalog lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    /// Derive the id of a target from its endpoint and backend reference.
    pub fn derive(endpoint: &str, reference: &str) -> Self {
        Self(format!("{}{}", endpoint.trim_end_matches('/'), reference))
    }

    /// Wrap an already-derived id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for TargetId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}
