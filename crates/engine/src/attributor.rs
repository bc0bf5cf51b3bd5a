//! Sponsor attribution.
//!
//! Works out which known contributors are implicated by a build: the authors
//! and messages of its changes, plus the culprits the backend names, are
//! searched in the offender directory, and when that yields nobody the
//! search moves up the build's cause chain.

use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use buildwatch_backend::Backend;
use buildwatch_core::{BuildSnapshot, Change, Sponsor};
use buildwatch_directory::OffenderDirectory;
use tracing::{debug, warn};

use crate::{EngineConfig, EngineError, Result};

type SponsorFuture<'a> = Pin<Box<dyn Future<Output = BTreeSet<Sponsor>> + Send + 'a>>;

/// Attributes builds to sponsors.
#[derive(Clone)]
pub struct SponsorAttributor {
    backend: Arc<dyn Backend>,
    directory: Arc<dyn OffenderDirectory>,
    config: EngineConfig,
}

impl SponsorAttributor {
    /// Create a new attributor.
    pub fn new(backend: Arc<dyn Backend>, directory: Arc<dyn OffenderDirectory>) -> Self {
        Self {
            backend,
            directory,
            config: EngineConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sponsors implicated by `build`.
    ///
    /// Never fails: an unreachable directory or backend contributes nobody.
    pub async fn sponsors_of(&self, build: &BuildSnapshot) -> BTreeSet<Sponsor> {
        let mut visited = HashSet::new();
        self.attribute(build, &mut visited).await
    }

    /// Sponsors named by the build's own changes and culprits, without
    /// following causes.
    pub async fn direct_sponsors(&self, build: &BuildSnapshot) -> Result<BTreeSet<Sponsor>> {
        let changes = self.config.bounded(self.backend.changes_of(build)).await?;
        if changes.is_empty() && build.culprits.is_empty() {
            return Ok(BTreeSet::new());
        }

        let text = attribution_text(&changes, &build.culprits);
        let timeout = self.config.call_timeout();
        match tokio::time::timeout(timeout, self.directory.search(&text)).await {
            Ok(found) => found.map_err(|e| EngineError::AttributionUnavailable(e.to_string())),
            Err(_) => Err(EngineError::AttributionUnavailable(format!(
                "search timed out after {:?}",
                timeout
            ))),
        }
    }

    /// Attribute recursively, never descending into a build twice.
    fn attribute<'a>(
        &'a self,
        build: &'a BuildSnapshot,
        visited: &'a mut HashSet<String>,
    ) -> SponsorFuture<'a> {
        Box::pin(async move {
            visited.insert(build.id.clone());

            let direct = match self.direct_sponsors(build).await {
                Ok(sponsors) => sponsors,
                Err(e) => {
                    warn!("Attribution of build {} degraded: {}", build.id, e);
                    BTreeSet::new()
                }
            };
            if !direct.is_empty() {
                return direct;
            }

            let mut sponsors = BTreeSet::new();
            for cause in &build.upstream {
                if !visited.insert(cause.id.clone()) {
                    debug!("Skipping upstream build {} (already visited)", cause.id);
                    continue;
                }

                let upstream = match self.config.bounded(self.backend.build_detail(cause)).await {
                    Ok(upstream) => upstream,
                    Err(e) => {
                        warn!("Skipping upstream build {}: {}", cause.id, e);
                        continue;
                    }
                };
                sponsors.extend(self.attribute(&upstream, visited).await);
            }
            sponsors
        })
    }
}

/// The text searched for a build: author then message of each change,
/// then each culprit's name, every part followed by a space.
pub fn attribution_text(changes: &[Change], culprits: &[String]) -> String {
    let mut text = String::new();
    for change in changes {
        text.push_str(&change.author);
        text.push(' ');
        text.push_str(&change.message);
        text.push(' ');
    }
    for culprit in culprits {
        text.push_str(culprit);
        text.push(' ');
    }
    text
}
