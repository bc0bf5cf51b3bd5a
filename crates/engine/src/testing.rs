//! Fakes shared by the engine tests.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use buildwatch_backend::{Backend, BackendError, MemoryBackend, Result, TargetRecord};
use buildwatch_core::{
    BuildRef, BuildSnapshot, Change, Feature, Investigation, Status, Sponsor, TargetHandle,
    TargetId, Time,
};
use buildwatch_directory::{DirectoryError, KnownOffenders, Offender, OffenderDirectory};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};

pub const ENDPOINT: &str = "http://ci.test";

/// Minutes after a fixed reference instant.
pub fn at(minutes: i64) -> Time {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + ChronoDuration::minutes(minutes)
}

pub fn handle(reference: &str) -> TargetHandle {
    let mut handle = TargetHandle::new(reference, reference.trim_start_matches('/'));
    handle.project = "Core".to_string();
    handle
}

pub fn build(id: &str, start: i64, status: Status) -> BuildSnapshot {
    BuildSnapshot::new(id, at(start), status)
}

pub fn changed_by(mut build: BuildSnapshot, author: &str, message: &str) -> BuildSnapshot {
    build.changes.push(Change::new(author, message));
    build
}

pub fn caused_by(mut build: BuildSnapshot, upstream: &str) -> BuildSnapshot {
    build.upstream.push(BuildRef::new(upstream, Status::Unknown));
    build
}

pub fn target(reference: &str) -> TargetRecord {
    TargetRecord::new(handle(reference))
}

pub fn opened(minutes: i64, open: bool) -> Investigation {
    Investigation::new(at(minutes), open)
}

pub fn feature() -> Feature {
    Feature::new("Core", ENDPOINT)
}

pub fn offenders() -> Arc<CountingDirectory> {
    let known = KnownOffenders::new(vec![
        Offender::new("alice").alias("asmith"),
        Offender::new("bob"),
        Offender::new("carol"),
    ])
    .unwrap();
    Arc::new(CountingDirectory::new(known))
}

pub fn sponsors(names: &[&str]) -> BTreeSet<Sponsor> {
    names.iter().map(|n| Sponsor::new(*n)).collect()
}

/// Directory that counts how often it was searched.
pub struct CountingDirectory {
    inner: KnownOffenders,
    calls: AtomicUsize,
}

impl CountingDirectory {
    pub fn new(inner: KnownOffenders) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OffenderDirectory for CountingDirectory {
    async fn search(&self, text: &str) -> buildwatch_directory::Result<BTreeSet<Sponsor>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(text).await
    }
}

/// Directory that is always down.
pub struct BrokenDirectory;

#[async_trait]
impl OffenderDirectory for BrokenDirectory {
    async fn search(&self, _text: &str) -> buildwatch_directory::Result<BTreeSet<Sponsor>> {
        Err(DirectoryError::Unavailable("directory offline".to_string()))
    }
}

/// Backend that stalls on chosen targets before delegating.
pub struct SlowBackend {
    pub inner: MemoryBackend,
    pub slow: HashSet<String>,
    pub delay: Duration,
}

impl SlowBackend {
    async fn stall(&self, target: &TargetHandle) {
        if self.slow.contains(&target.reference) {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl Backend for SlowBackend {
    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    async fn is_paused(&self, target: &TargetHandle) -> Result<bool> {
        self.stall(target).await;
        self.inner.is_paused(target).await
    }

    async fn running_builds(&self, target: &TargetHandle) -> Result<Vec<BuildRef>> {
        self.inner.running_builds(target).await
    }

    async fn last_completed_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.inner.last_completed_build(target).await
    }

    async fn last_successful_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.inner.last_successful_build(target).await
    }

    async fn investigations(&self, target: &TargetHandle) -> Result<Vec<Investigation>> {
        self.inner.investigations(target).await
    }

    async fn build_detail(&self, build: &BuildRef) -> Result<BuildSnapshot> {
        self.inner.build_detail(build).await
    }

    async fn post_comment(&self, build: &BuildRef, text: &str) -> Result<()> {
        self.inner.post_comment(build, text).await
    }

    async fn enumerate_targets(&self, feature: &Feature) -> Result<Vec<(TargetId, TargetHandle)>> {
        self.inner.enumerate_targets(feature).await
    }
}

/// Backend whose enumeration always fails.
pub struct DownBackend;

#[async_trait]
impl Backend for DownBackend {
    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    async fn is_paused(&self, _target: &TargetHandle) -> Result<bool> {
        Err(down())
    }

    async fn running_builds(&self, _target: &TargetHandle) -> Result<Vec<BuildRef>> {
        Err(down())
    }

    async fn last_completed_build(&self, _target: &TargetHandle) -> Result<Option<BuildRef>> {
        Err(down())
    }

    async fn last_successful_build(&self, _target: &TargetHandle) -> Result<Option<BuildRef>> {
        Err(down())
    }

    async fn investigations(&self, _target: &TargetHandle) -> Result<Vec<Investigation>> {
        Err(down())
    }

    async fn build_detail(&self, _build: &BuildRef) -> Result<BuildSnapshot> {
        Err(down())
    }

    async fn post_comment(&self, _build: &BuildRef, _text: &str) -> Result<()> {
        Err(down())
    }

    async fn enumerate_targets(&self, _feature: &Feature) -> Result<Vec<(TargetId, TargetHandle)>> {
        Err(down())
    }
}

fn down() -> BackendError {
    BackendError::Unavailable("connection refused".to_string())
}

/// Backend whose enumeration can be cut down after the fact.
pub struct ShrinkingBackend {
    inner: MemoryBackend,
    limit: AtomicUsize,
    enumerations: AtomicUsize,
    first_delay: Option<Duration>,
}

impl ShrinkingBackend {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            limit: AtomicUsize::new(usize::MAX),
            enumerations: AtomicUsize::new(0),
            first_delay: None,
        }
    }

    /// Stall the first enumeration after it has read the limit.
    pub fn with_first_delay(mut self, delay: Duration) -> Self {
        self.first_delay = Some(delay);
        self
    }

    pub fn limit_to(&self, limit: usize) {
        self.limit.store(limit, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for ShrinkingBackend {
    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    async fn is_paused(&self, target: &TargetHandle) -> Result<bool> {
        self.inner.is_paused(target).await
    }

    async fn running_builds(&self, target: &TargetHandle) -> Result<Vec<BuildRef>> {
        self.inner.running_builds(target).await
    }

    async fn last_completed_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.inner.last_completed_build(target).await
    }

    async fn last_successful_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.inner.last_successful_build(target).await
    }

    async fn investigations(&self, target: &TargetHandle) -> Result<Vec<Investigation>> {
        self.inner.investigations(target).await
    }

    async fn build_detail(&self, build: &BuildRef) -> Result<BuildSnapshot> {
        self.inner.build_detail(build).await
    }

    async fn post_comment(&self, build: &BuildRef, text: &str) -> Result<()> {
        self.inner.post_comment(build, text).await
    }

    async fn enumerate_targets(&self, feature: &Feature) -> Result<Vec<(TargetId, TargetHandle)>> {
        let limit = self.limit.load(Ordering::SeqCst);
        if self.enumerations.fetch_add(1, Ordering::SeqCst) == 0 {
            if let Some(delay) = self.first_delay {
                tokio::time::sleep(delay).await;
            }
        }
        let mut targets = self.inner.enumerate_targets(feature).await?;
        targets.truncate(limit);
        Ok(targets)
    }
}

/// Backend that fails chosen calls and delegates the rest.
pub struct FaultyBackend {
    inner: MemoryBackend,
    refuse_comments: bool,
    no_changes: HashSet<String>,
    no_detail: HashSet<String>,
}

impl FaultyBackend {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            refuse_comments: false,
            no_changes: HashSet::new(),
            no_detail: HashSet::new(),
        }
    }

    pub fn refusing_comments(mut self) -> Self {
        self.refuse_comments = true;
        self
    }

    pub fn without_changes_for(mut self, build: &str) -> Self {
        self.no_changes.insert(build.to_string());
        self
    }

    pub fn without_detail_for(mut self, build: &str) -> Self {
        self.no_detail.insert(build.to_string());
        self
    }

    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }
}

#[async_trait]
impl Backend for FaultyBackend {
    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    async fn is_paused(&self, target: &TargetHandle) -> Result<bool> {
        self.inner.is_paused(target).await
    }

    async fn running_builds(&self, target: &TargetHandle) -> Result<Vec<BuildRef>> {
        self.inner.running_builds(target).await
    }

    async fn last_completed_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.inner.last_completed_build(target).await
    }

    async fn last_successful_build(&self, target: &TargetHandle) -> Result<Option<BuildRef>> {
        self.inner.last_successful_build(target).await
    }

    async fn investigations(&self, target: &TargetHandle) -> Result<Vec<Investigation>> {
        self.inner.investigations(target).await
    }

    async fn build_detail(&self, build: &BuildRef) -> Result<BuildSnapshot> {
        if self.no_detail.contains(&build.id) {
            return Err(down());
        }
        self.inner.build_detail(build).await
    }

    async fn changes_of(&self, build: &BuildSnapshot) -> Result<Vec<Change>> {
        if self.no_changes.contains(&build.id) {
            return Err(down());
        }
        self.inner.changes_of(build).await
    }

    async fn post_comment(&self, build: &BuildRef, text: &str) -> Result<()> {
        if self.refuse_comments {
            return Err(BackendError::Unavailable("comment rejected".to_string()));
        }
        self.inner.post_comment(build, text).await
    }

    async fn enumerate_targets(&self, feature: &Feature) -> Result<Vec<(TargetId, TargetHandle)>> {
        self.inner.enumerate_targets(feature).await
    }
}
