//! Catalog of monitored targets.
//!
//! Maps the opaque [`TargetId`]s handed to callers back to backend handles.
//! The catalog is a copy-on-write snapshot: registering a feature builds a
//! new map and swaps it in, so lookups always see a complete catalog.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use buildwatch_backend::Backend;
use buildwatch_core::{Feature, Status, TargetDetail, TargetHandle, TargetId};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::{EngineError, Result, StatusResolver};

type FeatureTargets = HashMap<TargetId, TargetHandle>;

/// Immutable view of the catalog at one point in time.
#[derive(Debug, Default)]
struct Snapshot {
    by_feature: HashMap<Feature, FeatureTargets>,
}

impl Snapshot {
    fn lookup(&self, id: &TargetId) -> Option<&TargetHandle> {
        self.by_feature.values().find_map(|targets| targets.get(id))
    }

    fn targets(&self) -> BTreeMap<TargetId, TargetHandle> {
        self.by_feature
            .values()
            .flat_map(|targets| targets.iter())
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect()
    }
}

/// Registry of targets for one backend.
pub struct TargetCatalog {
    backend: Arc<dyn Backend>,
    resolver: StatusResolver,
    snapshot: RwLock<Arc<Snapshot>>,
    registration: Mutex<()>,
}

impl TargetCatalog {
    /// Create an empty catalog over the resolver's backend.
    pub fn new(resolver: StatusResolver) -> Self {
        Self {
            backend: resolver.backend().clone(),
            resolver,
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            registration: Mutex::new(()),
        }
    }

    /// Enumerate the targets of `feature`, replacing whatever was registered
    /// for it before.
    ///
    /// A feature the backend cannot speak for, or a failed enumeration,
    /// yields no ids and leaves the catalog as it was. Registrations run one
    /// at a time, so the one that started last is the one that sticks.
    pub async fn register(&self, feature: &Feature) -> Vec<TargetId> {
        if !self.backend.can_speak_for(feature) {
            debug!(
                "{} does not serve feature '{}' on {}",
                self.backend.endpoint(),
                feature.name,
                feature.endpoint
            );
            return Vec::new();
        }

        let _registering = self.registration.lock().await;
        let enumerated = self
            .resolver
            .config()
            .bounded(self.backend.enumerate_targets(feature))
            .await;
        let targets = match enumerated {
            Ok(targets) => targets,
            Err(e) => {
                warn!("Enumeration of feature '{}' failed: {}", feature.name, e);
                return Vec::new();
            }
        };

        let ids: Vec<TargetId> = targets.iter().map(|(id, _)| id.clone()).collect();
        let replacement: FeatureTargets = targets.into_iter().collect();

        let mut current = self.snapshot.write().await;
        let mut by_feature = current.by_feature.clone();
        by_feature.insert(feature.normalized(), replacement);
        *current = Arc::new(Snapshot { by_feature });

        info!("Registered {} targets for feature '{}'", ids.len(), feature.name);
        ids
    }

    /// Backend handle registered under `id`.
    pub async fn resolve(&self, id: &TargetId) -> Result<TargetHandle> {
        self.current()
            .await
            .lookup(id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    /// Current status of a registered target.
    pub async fn status_of(&self, id: &TargetId) -> Result<TargetDetail> {
        let handle = self.resolve(id).await?;
        Ok(self.resolver.resolve(&handle).await)
    }

    /// Post `note` on the target's last completed build if it is broken.
    ///
    /// Returns `Ok(true)` when the note was posted and `Ok(false)` when there
    /// was nothing broken to annotate or the backend refused.
    pub async fn annotate(&self, id: &TargetId, note: &str) -> Result<bool> {
        let handle = self.resolve(id).await?;

        let config = self.resolver.config();
        let attempt = async {
            let Some(last) = config
                .bounded(self.backend.last_completed_build(&handle))
                .await?
            else {
                return Ok(false);
            };
            if last.status != Status::Broken {
                return Ok(false);
            }
            config.bounded(self.backend.post_comment(&last, note)).await?;
            info!("Annotated build {} of {}", last.id, handle.reference);
            Ok::<_, buildwatch_backend::BackendError>(true)
        };

        match attempt.await {
            Ok(posted) => Ok(posted),
            Err(e) => {
                warn!("Annotation of {} failed: {}", handle.reference, e);
                Ok(false)
            }
        }
    }

    /// Every registered id.
    pub async fn ids(&self) -> Vec<TargetId> {
        self.current().await.targets().into_keys().collect()
    }

    /// Resolve every registered target concurrently.
    ///
    /// All targets come from one catalog snapshot. Results are ordered by
    /// display name.
    pub async fn resolve_all(&self) -> Vec<(TargetId, TargetDetail)> {
        let mut tasks = JoinSet::new();
        for (id, handle) in self.current().await.targets() {
            let resolver = self.resolver.clone();
            tasks.spawn(async move {
                let detail = resolver.resolve(&handle).await;
                (id, detail)
            });
        }

        let mut resolved = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => resolved.push(entry),
                Err(e) => error!("Resolution task failed: {}", e),
            }
        }
        resolved.sort_by(|a, b| {
            a.1.display_name
                .cmp(&b.1.display_name)
                .then_with(|| a.0.cmp(&b.0))
        });
        resolved
    }

    async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }
}
