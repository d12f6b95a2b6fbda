//! Sync-eligibility resolution over the registry namespace tree.
//!
//! A node is in scope when it, or any ancestor stem up to the root, carries
//! a direct assignment of the sync marker. Decisions are memoized for the
//! lifetime of the connector instance; the change-event stream is trusted
//! to signal deletions so stale decisions can be dropped (`forget`).

use registry::{RegistryClient, RegistryGroup, RegistryResult, StemScope, SyncMarker, parent_name};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct SyncPolicyResolver {
    registry: Arc<dyn RegistryClient>,
    marker: SyncMarker,
    decisions: RwLock<HashMap<String, bool>>
}

impl SyncPolicyResolver {
    pub fn new(registry: Arc<dyn RegistryClient>, marker: SyncMarker) -> Self {
        Self {
            registry,
            marker,
            decisions: RwLock::new(HashMap::new())
        }
    }

    pub async fn should_sync_group(&self, group: &RegistryGroup) -> RegistryResult<bool> {
        if let Some(decision) = self.decisions.read().await.get(&group.name) {
            return Ok(*decision);
        }

        let result = if self.registry.group_has_marker(&group.name, &self.marker).await? {
            true
        } else {
            self.should_sync_stem(&group.parent_stem_name()).await?
        };

        self.decisions.write().await.insert(group.name.clone(), result);
        debug!(node = %group.name, decision = result, "resolved group sync eligibility");
        Ok(result)
    }

    /// Walks the stem chain towards the root, stopping at the first direct
    /// marker assignment or previously memoized decision. Every stem walked
    /// past had neither, so its decision equals the terminal result and the
    /// whole path is backfilled in one pass.
    pub async fn should_sync_stem(&self, stem_name: &str) -> RegistryResult<bool> {
        let mut path: Vec<String> = Vec::new();
        let mut current = stem_name.to_string();

        let result = loop {
            if let Some(decision) = self.decisions.read().await.get(&current) {
                break *decision;
            }
            if self.registry.stem_has_marker(&current, &self.marker).await? {
                path.push(current);
                break true;
            }
            match parent_name(&current) {
                Some(parent) => {
                    path.push(current);
                    current = parent;
                }
                // Root without an assignment: out of scope, recursion ends.
                None => {
                    path.push(current);
                    break false;
                }
            }
        };

        if !path.is_empty() {
            let mut decisions = self.decisions.write().await;
            for name in path {
                decisions.insert(name, result);
            }
        }

        Ok(result)
    }

    /// Bulk pre-population: records an in-scope decision for every node with
    /// a direct marker assignment, and optionally for every descendant group
    /// of each marked stem. Never records out-of-scope decisions; nodes not
    /// touched here stay unknown and are resolved lazily.
    pub async fn cache_synced_objects(&self, fully_populate: bool) -> RegistryResult<()> {
        let stems = self.registry.stems_with_marker(&self.marker).await?;
        let mut descendants: Vec<RegistryGroup> = Vec::new();

        if fully_populate {
            for stem in &stems {
                descendants.extend(
                    self.registry
                        .child_groups(&stem.name, StemScope::Sub)
                        .await?
                );
            }
        }

        let groups = self.registry.groups_with_marker(&self.marker).await?;

        let mut decisions = self.decisions.write().await;
        for stem in &stems {
            decisions.insert(stem.name.clone(), true);
        }
        for group in descendants.iter().chain(groups.iter()) {
            decisions.insert(group.name.clone(), true);
        }

        info!(
            stems = stems.len(),
            groups = groups.len(),
            descendants = descendants.len(),
            fully_populate,
            "pre-populated sync decision cache"
        );
        Ok(())
    }

    /// Drops the memoized decision for a deleted node.
    pub async fn forget(&self, name: &str) {
        self.decisions.write().await.remove(name);
    }

    pub async fn decision(&self, name: &str) -> Option<bool> {
        self.decisions.read().await.get(name).copied()
    }

    /// Snapshot of the decision cache, for diagnostics.
    pub async fn decisions(&self) -> HashMap<String, bool> {
        self.decisions.read().await.clone()
    }
}
