use crate::error::DirectoryResult;
use crate::settings::GroupSettings;
use crate::types::{DirectoryGroup, DirectoryMember, DirectoryUser};
use async_trait::async_trait;

/// Client interface to the remote directory service.
///
/// Implementations own transport, authentication, and retry; callers treat
/// every method as a single blocking remote round-trip. Reads report
/// structured absence through the `*NotFound` error variants.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn retrieve_all_users(&self) -> DirectoryResult<Vec<DirectoryUser>>;

    async fn retrieve_all_groups(&self) -> DirectoryResult<Vec<DirectoryGroup>>;

    async fn retrieve_user(&self, user_key: &str) -> DirectoryResult<DirectoryUser>;

    async fn retrieve_group(&self, group_key: &str) -> DirectoryResult<DirectoryGroup>;

    async fn add_user(&self, user: DirectoryUser) -> DirectoryResult<DirectoryUser>;

    async fn add_group(&self, group: DirectoryGroup) -> DirectoryResult<DirectoryGroup>;

    async fn update_group(
        &self,
        group_key: &str,
        group: DirectoryGroup
    ) -> DirectoryResult<DirectoryGroup>;

    async fn remove_group(&self, group_key: &str) -> DirectoryResult<()>;

    async fn add_group_member(
        &self,
        group_key: &str,
        member: DirectoryMember
    ) -> DirectoryResult<DirectoryMember>;

    async fn remove_group_member(&self, group_key: &str, user_key: &str) -> DirectoryResult<()>;

    async fn retrieve_group_members(&self, group_key: &str)
    -> DirectoryResult<Vec<DirectoryMember>>;

    async fn retrieve_group_settings(&self, group_key: &str) -> DirectoryResult<GroupSettings>;

    async fn update_group_settings(
        &self,
        group_key: &str,
        settings: GroupSettings
    ) -> DirectoryResult<GroupSettings>;
}
