//! Status resolution.
//!
//! Combines a target's running builds, its last completed build and its
//! investigations into one [`TargetDetail`]:
//!
//! ```text
//! paused? -> Disabled
//! running builds -> progress + start times
//! last completed (when idle or broken) -> status
//! broken + newer open investigation -> UnderInvestigation
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use buildwatch_backend::Backend;
use buildwatch_core::{
    epoch, BuildSnapshot, RunningBuild, Status, TargetDetail, TargetHandle, TargetId, Time,
};
use buildwatch_directory::OffenderDirectory;
use buildwatch_progress::ProgressEstimator;
use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::{EngineConfig, Result, SponsorAttributor};

/// Resolves the status of single targets.
#[derive(Clone)]
pub struct StatusResolver {
    backend: Arc<dyn Backend>,
    attributor: SponsorAttributor,
    estimator: ProgressEstimator,
    config: EngineConfig,
    clock: fn() -> Time,
}

impl StatusResolver {
    /// Create a new resolver.
    pub fn new(backend: Arc<dyn Backend>, directory: Arc<dyn OffenderDirectory>) -> Self {
        Self {
            attributor: SponsorAttributor::new(backend.clone(), directory),
            backend,
            estimator: ProgressEstimator,
            config: EngineConfig::default(),
            clock: Utc::now,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.attributor = self.attributor.with_config(config.clone());
        self.config = config;
        self
    }

    /// Set the clock used to measure running builds.
    pub fn with_clock(mut self, clock: fn() -> Time) -> Self {
        self.clock = clock;
        self
    }

    /// The backend this resolver reads.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a target.
    ///
    /// Never fails: when the backend cannot be read the target resolves to
    /// [`Status::Unknown`] with empty collections.
    pub async fn resolve(&self, target: &TargetHandle) -> TargetDetail {
        match self.try_resolve(target).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Resolution of {} degraded to unknown: {}", target.reference, e);
                self.bare(target, Status::Unknown)
            }
        }
    }

    /// Resolve a target, surfacing backend failures.
    pub async fn try_resolve(&self, target: &TargetHandle) -> Result<TargetDetail> {
        let backend = &self.backend;
        let config = &self.config;

        if config.bounded(backend.is_paused(target)).await? {
            debug!("{} is paused", target.reference);
            return Ok(self.bare(target, Status::Disabled));
        }

        let mut start_time = epoch();
        let mut inspected: Vec<BuildSnapshot> = Vec::new();
        let mut running_builds = Vec::new();

        let running = config.bounded(backend.running_builds(target)).await?;
        let mut baseline: Option<Option<Duration>> = None;
        for build in &running {
            let detail = config.bounded(backend.build_detail(build)).await?;
            start_time = start_time.max(detail.start_time);

            let completion = match detail.reported_percent {
                Some(reported) => reported,
                None => {
                    if baseline.is_none() {
                        baseline = Some(self.baseline(target).await);
                    }
                    let expected = baseline.flatten();
                    self.estimator.estimate(detail.start_time, (self.clock)(), expected)
                }
            };
            running_builds.push(RunningBuild::new(completion, detail.status));
            inspected.push(detail);
        }

        let mut status = Status::Unknown;
        if let Some(last) = config.bounded(backend.last_completed_build(target)).await? {
            status = last.status;
            // A build in flight cannot mask a completed failure.
            if running_builds.is_empty() || status == Status::Broken {
                let detail = config.bounded(backend.build_detail(&last)).await?;
                start_time = start_time.max(detail.start_time);
                status = detail.status;
                inspected.push(detail);
            }
        }

        if status == Status::Broken {
            let investigations = config.bounded(backend.investigations(target)).await?;
            if investigations.first().is_some_and(|i| i.covers(start_time)) {
                debug!("{} is broken but under investigation", target.reference);
                status = Status::UnderInvestigation;
            }
        }

        let mut sponsors = BTreeSet::new();
        if status.carries_blame() {
            for build in &inspected {
                sponsors.extend(self.attributor.sponsors_of(build).await);
            }
        }

        Ok(TargetDetail {
            status,
            last_start_time: start_time,
            running_builds,
            sponsors,
            ..self.bare(target, status)
        })
    }

    /// Duration of the last successful build, used as the progress baseline.
    async fn baseline(&self, target: &TargetHandle) -> Option<Duration> {
        let lookup = async {
            let Some(success) = self
                .config
                .bounded(self.backend.last_successful_build(target))
                .await?
            else {
                return Ok(None);
            };
            let detail = self.config.bounded(self.backend.build_detail(&success)).await?;
            Ok::<_, buildwatch_backend::BackendError>(detail.duration())
        };

        match lookup.await {
            Ok(duration) => duration,
            Err(e) => {
                debug!("No progress baseline for {}: {}", target.reference, e);
                None
            }
        }
    }

    fn bare(&self, target: &TargetHandle, status: Status) -> TargetDetail {
        TargetDetail::bare(
            TargetId::derive(self.backend.endpoint(), &target.reference).to_string(),
            target.web_url.clone(),
            target.name.clone(),
            status,
        )
    }
}
