//! Targets, features and the resolved per-target detail.

use crate::{epoch, RunningBuild, Sponsor, Status, Time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named grouping of targets on one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    /// Project/view name; empty means every target on the endpoint
    pub name: String,

    /// Backend endpoint the feature lives on
    pub endpoint: String,
}

impl Feature {
    /// Create a new feature.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Whether a target in `project` belongs to this feature.
    pub fn includes(&self, project: &str) -> bool {
        let name = self.name.trim();
        name.is_empty() || project.trim() == name
    }

    /// The same feature with surrounding whitespace and trailing slashes
    /// removed, so equivalent spellings compare equal.
    pub fn normalized(&self) -> Feature {
        Feature {
            name: self.name.trim().to_string(),
            endpoint: self.endpoint.trim().trim_end_matches('/').to_string(),
        }
    }
}

/// Backend-specific handle to a target, kept by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHandle {
    /// Backend reference (href, job url...)
    pub reference: String,

    /// Display name
    pub name: String,

    /// Link for humans
    #[serde(default)]
    pub web_url: String,

    /// Project the target belongs to
    #[serde(default)]
    pub project: String,
}

impl TargetHandle {
    /// Create a new handle.
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            web_url: String::new(),
            project: String::new(),
        }
    }
}

/// The resolved status of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDetail {
    /// Endpoint plus backend reference
    pub external_ref: String,

    /// Link for humans
    pub web_url: String,

    /// Display name
    pub display_name: String,

    /// Resolved status
    pub status: Status,

    /// Latest start time among the builds inspected
    pub last_start_time: Time,

    /// Builds in flight
    pub running_builds: Vec<RunningBuild>,

    /// Contributors implicated in a breakage
    pub sponsors: BTreeSet<Sponsor>,
}

impl TargetDetail {
    /// A detail carrying only identity and a status, with zero timestamp and
    /// empty collections.
    pub fn bare(
        external_ref: impl Into<String>,
        web_url: impl Into<String>,
        display_name: impl Into<String>,
        status: Status,
    ) -> Self {
        Self {
            external_ref: external_ref.into(),
            web_url: web_url.into(),
            display_name: display_name.into(),
            status,
            last_start_time: epoch(),
            running_builds: Vec::new(),
            sponsors: BTreeSet::new(),
        }
    }

    /// Whether any build is in flight.
    pub fn is_building(&self) -> bool {
        !self.running_builds.is_empty()
    }
}
