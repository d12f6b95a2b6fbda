use crate::error::RegistryResult;
use crate::types::{GroupMember, RegistryGroup, Stem, StemScope, Subject, SyncMarker};
use async_trait::async_trait;

/// Lookup interface over the source-of-truth registry.
///
/// Implementations wrap whatever session or DAO layer the registry exposes;
/// the connector only depends on this trait.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn find_group(&self, name: &str) -> RegistryResult<Option<RegistryGroup>>;

    async fn find_stem(&self, name: &str) -> RegistryResult<Option<Stem>>;

    async fn find_subject(
        &self,
        source_id: &str,
        subject_id: &str
    ) -> RegistryResult<Option<Subject>>;

    /// Whether the group carries at least one direct assignment of the marker.
    async fn group_has_marker(&self, group_name: &str, marker: &SyncMarker)
    -> RegistryResult<bool>;

    /// Whether the stem carries at least one direct assignment of the marker.
    async fn stem_has_marker(&self, stem_name: &str, marker: &SyncMarker) -> RegistryResult<bool>;

    /// All stems with a direct assignment of the marker.
    async fn stems_with_marker(&self, marker: &SyncMarker) -> RegistryResult<Vec<Stem>>;

    /// All groups with a direct assignment of the marker.
    async fn groups_with_marker(&self, marker: &SyncMarker) -> RegistryResult<Vec<RegistryGroup>>;

    async fn child_groups(
        &self,
        stem_name: &str,
        scope: StemScope
    ) -> RegistryResult<Vec<RegistryGroup>>;

    /// Direct members of a group.
    async fn group_members(&self, group_name: &str) -> RegistryResult<Vec<GroupMember>>;
}
