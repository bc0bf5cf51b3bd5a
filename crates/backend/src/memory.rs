//! In-memory backend adapter.
//!
//! Holds normalized targets and builds in memory. It can be loaded from a
//! JSON fixture whose builds carry raw backend status codes, which are
//! translated through the fixture's [`Dialect`]. Posted comments are kept so
//! callers can inspect them.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use buildwatch_core::{
    BuildRef, BuildSnapshot, Change, Feature, Investigation, Percentage, Status, TargetHandle,
    TargetId, Time,
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Backend, BackendError, Dialect, Result};

/// On-disk description of a backend's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Endpoint the fixture pretends to be
    pub endpoint: String,

    /// How build codes are to be read
    pub dialect: Dialect,

    /// Monitored targets
    #[serde(default)]
    pub targets: Vec<FixtureTarget>,

    /// Every build referenced by a target
    #[serde(default)]
    pub builds: Vec<FixtureBuild>,
}

/// One target in a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTarget {
    /// Backend handle
    #[serde(flatten)]
    pub handle: TargetHandle,

    /// Paused on the backend
    #[serde(default)]
    pub paused: bool,

    /// Ids of builds in flight
    #[serde(default)]
    pub running: Vec<String>,

    /// Id of the most recent finished build
    #[serde(default)]
    pub last_completed: Option<String>,

    /// Id of the most recent successful build
    #[serde(default)]
    pub last_successful: Option<String>,

    /// Investigations, most recent first
    #[serde(default)]
    pub investigations: Vec<Investigation>,
}

/// One build in a fixture, with its raw status code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureBuild {
    /// Backend build id
    pub id: String,

    /// Raw status code in the fixture's dialect
    pub code: String,

    /// When the build started
    pub start_time: Time,

    /// Duration in milliseconds, once completed
    #[serde(default)]
    pub duration_ms: Option<i64>,

    /// Backend-reported completion
    #[serde(default)]
    pub percent: Option<Percentage>,

    /// Changes that went into the build
    #[serde(default)]
    pub changes: Vec<Change>,

    /// Ids of upstream builds that caused this one
    #[serde(default)]
    pub upstream: Vec<String>,

    /// Full names of users blamed for the build
    #[serde(default)]
    pub culprits: Vec<String>,
}

/// Normalized state of one target.
#[derive(Debug, Clone)]
pub struct TargetRecord {
    /// Backend handle
    pub handle: TargetHandle,

    /// Paused on the backend
    pub paused: bool,

    /// Ids of builds in flight
    pub running: Vec<String>,

    /// Id of the most recent finished build
    pub last_completed: Option<String>,

    /// Id of the most recent successful build
    pub last_successful: Option<String>,

    /// Investigations, most recent first
    pub investigations: Vec<Investigation>,
}

impl TargetRecord {
    /// A target with no builds and no investigations.
    pub fn new(handle: TargetHandle) -> Self {
        Self {
            handle,
            paused: false,
            running: Vec::new(),
            last_completed: None,
            last_successful: None,
            investigations: Vec::new(),
        }
    }
}

impl From<FixtureTarget> for TargetRecord {
    fn from(target: FixtureTarget) -> Self {
        Self {
            handle: target.handle,
            paused: target.paused,
            running: target.running,
            last_completed: target.last_completed,
            last_successful: target.last_successful,
            investigations: target.investigations,
        }
    }
}

/// In-memory backend.
pub struct MemoryBackend {
    endpoint: String,
    targets: HashMap<String, TargetRecord>,
    builds: HashMap<String, BuildSnapshot>,
    unavailable: HashSet<String>,
    comments: Mutex<Vec<(String, String)>>,
}

impl MemoryBackend {
    /// Create an empty backend for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            targets: HashMap::new(),
            builds: HashMap::new(),
            unavailable: HashSet::new(),
            comments: Mutex::new(Vec::new()),
        }
    }

    /// Build a backend from a parsed fixture.
    pub fn from_fixture(fixture: Fixture) -> Self {
        let codes: HashMap<String, Status> = fixture
            .builds
            .iter()
            .map(|b| (b.id.clone(), fixture.dialect.status_of(&b.code)))
            .collect();

        let mut backend = Self::new(fixture.endpoint);
        for build in fixture.builds {
            let status = codes.get(&build.id).copied().unwrap_or_default();
            let upstream = build
                .upstream
                .iter()
                .map(|id| BuildRef::new(id.clone(), codes.get(id).copied().unwrap_or_default()))
                .collect();
            backend.insert_build(BuildSnapshot {
                id: build.id,
                start_time: build.start_time,
                status,
                duration_ms: build.duration_ms,
                reported_percent: build.percent,
                changes: build.changes,
                upstream,
                culprits: build.culprits,
            });
        }
        for target in fixture.targets {
            backend.insert_target(target.into());
        }
        backend
    }

    /// Load a backend from a JSON fixture file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        let fixture: Fixture = serde_json::from_str(&contents)?;
        debug!(
            "Loaded fixture for {} with {} targets and {} builds",
            fixture.endpoint,
            fixture.targets.len(),
            fixture.builds.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Add or replace a target.
    pub fn insert_target(&mut self, record: TargetRecord) {
        self.targets.insert(record.handle.reference.clone(), record);
    }

    /// Add or replace a build.
    pub fn insert_build(&mut self, build: BuildSnapshot) {
        self.builds.insert(build.id.clone(), build);
    }

    /// Make every call about a target fail as if the backend were down.
    pub fn mark_unavailable(&mut self, reference: impl Into<String>) {
        self.unavailable.insert(reference.into());
    }

    /// Comments posted so far, as `(build id, text)`.
    pub async fn comments(&self) -> Vec<(String, String)> {
        self.comments.lock().await.clone()
    }

    fn target(&self, handle: &TargetHandle) -> Result<&TargetRecord> {
        if self.unavailable.contains(&handle.reference) {
            return Err(BackendError::Unavailable(format!(
                "{} did not answer for {}",
                self.endpoint, handle.reference
            )));
        }
        self.targets
            .get(&handle.reference)
            .ok_or_else(|| BackendError::UnknownTarget(handle.reference.clone()))
    }

    fn build(&self, id: &str) -> Result<&BuildSnapshot> {
        self.builds
            .get(id)
            .ok_or_else(|| BackendError::UnknownBuild(id.to_string()))
    }

    fn listing(&self, id: &str) -> Result<BuildRef> {
        self.build(id).map(BuildSnapshot::to_ref)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn is_paused(&self, target: &TargetHandle) -> Result<bool> {
        Ok(self.target(target)?.paused)
    }

    async fn running_builds(&self, target: &TargetHandle) -> Result<Vec<BuildRef>> {
        self.target(target)?
            .running
            .iter()
            .map(|id| self.listing(id))
            .collect()
    }

    async fn last_completed_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.target(target)?
            .last_completed
            .as_deref()
            .map(|id| self.listing(id))
            .transpose()
    }

    async fn last_successful_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.target(target)?
            .last_successful
            .as_deref()
            .map(|id| self.listing(id))
            .transpose()
    }

    async fn investigations(&self, target: &TargetHandle) -> Result<Vec<Investigation>> {
        Ok(self.target(target)?.investigations.clone())
    }

    async fn build_detail(&self, build: &BuildRef) -> Result<BuildSnapshot> {
        self.build(&build.id).cloned()
    }

    async fn post_comment(&self, build: &BuildRef, text: &str) -> Result<()> {
        self.build(&build.id)?;
        self.comments
            .lock()
            .await
            .push((build.id.clone(), text.to_string()));
        Ok(())
    }

    async fn enumerate_targets(&self, feature: &Feature) -> Result<Vec<(TargetId, TargetHandle)>> {
        let mut handles: Vec<_> = self
            .targets
            .values()
            .filter(|t| feature.includes(&t.handle.project))
            .map(|t| t.handle.clone())
            .collect();
        handles.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(handles
            .into_iter()
            .map(|h| (TargetId::derive(&self.endpoint, &h.reference), h))
            .collect())
    }
}
