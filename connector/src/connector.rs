use crate::address::AddressFormatter;
use crate::cache::{DirectoryCacheService, EntityCache, subject_key};
use crate::config::{ConnectorConfig, DeletedGroupPolicy};
use crate::error::ConnectorResult;
use crate::resolver::SyncPolicyResolver;
use directory::{
    DirectoryClient, DirectoryGroup, DirectoryMember, DirectoryUser, MemberRole, UserName
};
use rand::RngCore;
use rand::rngs::OsRng;
use registry::{MemberType, RegistryClient, RegistryGroup, Stem, Subject, SyncMarker};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const REGISTRY_GROUP_SEED_HINT: usize = 100;
const SUBJECT_SEED_HINT: usize = 1000;

/// Reconciles registry state into the remote directory.
///
/// One instance serves one change-event stream; the external driver calls
/// the operations below one change record at a time. The directory caches
/// are shared across instances, the registry caches and decision cache are
/// instance-scoped.
pub struct DirectoryConnector {
    name: String,
    config: ConnectorConfig,
    directory: Arc<dyn DirectoryClient>,
    registry: Arc<dyn RegistryClient>,
    caches: Arc<DirectoryCacheService>,
    resolver: SyncPolicyResolver,
    address_formatter: AddressFormatter,
    registry_groups: RwLock<EntityCache<RegistryGroup>>,
    subjects: RwLock<EntityCache<Subject>>
}

impl DirectoryConnector {
    pub fn new(
        name: impl Into<String>,
        config: ConnectorConfig,
        directory: Arc<dyn DirectoryClient>,
        registry: Arc<dyn RegistryClient>,
        caches: Arc<DirectoryCacheService>,
        marker: SyncMarker
    ) -> Self {
        let address_formatter = AddressFormatter::new(
            &config.group_identifier_expression,
            &config.subject_identifier_expression,
            &config.domain
        );
        let registry_validity = config.registry_cache_validity();

        let mut registry_groups = EntityCache::new(registry_validity);
        registry_groups.seed_empty(REGISTRY_GROUP_SEED_HINT);
        let mut subjects = EntityCache::new(registry_validity);
        subjects.seed_empty(SUBJECT_SEED_HINT);

        Self {
            name: name.into(),
            resolver: SyncPolicyResolver::new(registry.clone(), marker),
            config,
            directory,
            registry,
            caches,
            address_formatter,
            registry_groups: RwLock::new(registry_groups),
            subjects: RwLock::new(subjects)
        }
    }

    /// Applies the configured validities to the shared directory caches and
    /// populates them. Population failures leave the connector degraded but
    /// functional: read-through fills the caches incrementally.
    pub async fn initialize(&self) {
        self.caches
            .set_group_validity(self.config.directory_group_cache_validity())
            .await;
        self.caches
            .set_user_validity(self.config.directory_user_cache_validity())
            .await;

        self.populate_user_cache().await;
        self.populate_group_cache().await;
    }

    pub async fn populate_user_cache(&self) {
        debug!(connector = %self.name, "populating the directory user cache");
        if !self.caches.users_expired().await {
            return;
        }
        match self.directory.retrieve_all_users().await {
            Ok(users) => {
                self.caches.seed_users(users).await;
                info!(
                    connector = %self.name,
                    count = self.caches.user_count().await,
                    "seeded directory user cache"
                );
            }
            Err(e) => {
                error!(connector = %self.name, error = %e, "failed to populate the user cache");
            }
        }
    }

    pub async fn populate_group_cache(&self) {
        debug!(connector = %self.name, "populating the directory group cache");
        if !self.caches.groups_expired().await {
            return;
        }
        match self.directory.retrieve_all_groups().await {
            Ok(groups) => {
                self.caches.seed_groups(groups).await;
                info!(
                    connector = %self.name,
                    count = self.caches.group_count().await,
                    "seeded directory group cache"
                );
            }
            Err(e) => {
                error!(connector = %self.name, error = %e, "failed to populate the group cache");
            }
        }
    }

    /// Read-through fetch of a remote group. Transport failures are logged
    /// and reported as a miss; only writes propagate errors.
    pub async fn fetch_directory_group(&self, group_key: &str) -> Option<DirectoryGroup> {
        if let Some(group) = self.caches.group(group_key).await {
            return Some(group);
        }
        match self.directory.retrieve_group(group_key).await {
            Ok(group) => {
                self.caches.put_group(group.clone()).await;
                Some(group)
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(
                    connector = %self.name,
                    group = %group_key,
                    error = %e,
                    "error fetching group from the directory"
                );
                None
            }
        }
    }

    /// Read-through fetch of a remote user.
    pub async fn fetch_directory_user(&self, user_key: &str) -> Option<DirectoryUser> {
        if let Some(user) = self.caches.user(user_key).await {
            return Some(user);
        }
        match self.directory.retrieve_user(user_key).await {
            Ok(user) => {
                self.caches.put_user(user.clone()).await;
                Some(user)
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(
                    connector = %self.name,
                    user = %user_key,
                    error = %e,
                    "error fetching user from the directory"
                );
                None
            }
        }
    }

    /// Read-through fetch of a registry group via the instance-local cache.
    pub async fn fetch_registry_group(&self, group_name: &str) -> Option<RegistryGroup> {
        if let Some(group) = self.registry_groups.read().await.get(group_name) {
            return Some(group);
        }
        match self.registry.find_group(group_name).await {
            Ok(Some(group)) => {
                self.registry_groups.write().await.put(group.clone());
                Some(group)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    connector = %self.name,
                    group = %group_name,
                    error = %e,
                    "error looking up registry group"
                );
                None
            }
        }
    }

    /// Read-through fetch of a subject via the instance-local cache.
    pub async fn fetch_subject(&self, source_id: &str, subject_id: &str) -> Option<Subject> {
        let key = subject_key(source_id, subject_id);
        if let Some(subject) = self.subjects.read().await.get(&key) {
            return Some(subject);
        }
        match self.registry.find_subject(source_id, subject_id).await {
            Ok(Some(subject)) => {
                self.subjects.write().await.put(subject.clone());
                Some(subject)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    connector = %self.name,
                    subject = %subject_id,
                    error = %e,
                    "error looking up subject"
                );
                None
            }
        }
    }

    /// Provisions a directory account for the subject, unless user
    /// provisioning is disabled (then `Ok(None)`).
    ///
    /// The generated password is never stored or logged; directory accounts
    /// authenticate through federated sign-on, not this credential.
    pub async fn create_user(&self, subject: &Subject) -> ConnectorResult<Option<DirectoryUser>> {
        if !self.config.provision_users {
            return Ok(None);
        }

        let primary_email = match subject.attribute("email") {
            Some(email) => email.to_string(),
            None => self.address_formatter.qualify_subject_address(&subject.id)
        };

        let user = DirectoryUser {
            primary_email,
            name: self.user_name_for(subject),
            password: Some(generate_password()),
            include_in_global_address_list: self.config.include_user_in_global_address_list,
            created_at: None
        };

        let created = self.directory.add_user(user).await?;
        self.caches.put_user(created.clone()).await;
        info!(
            connector = %self.name,
            user = %created.primary_email,
            "provisioned directory user"
        );
        Ok(Some(created))
    }

    fn user_name_for(&self, subject: &Subject) -> UserName {
        if self.config.use_simple_subject_naming {
            let mut parts = subject.name.split_whitespace();
            let given = parts.next().unwrap_or(&subject.name);
            let family = parts.last().unwrap_or(given);
            UserName {
                given_name: given.to_string(),
                family_name: family.to_string(),
                full_name: subject.name.clone()
            }
        } else {
            UserName {
                given_name: subject
                    .attribute(&self.config.subject_given_name_field)
                    .unwrap_or_default()
                    .to_string(),
                family_name: subject
                    .attribute(&self.config.subject_surname_field)
                    .unwrap_or_default()
                    .to_string(),
                full_name: subject.name.clone()
            }
        }
    }

    pub async fn create_member(
        &self,
        group_key: &str,
        user: &DirectoryUser,
        role: MemberRole
    ) -> ConnectorResult<()> {
        let member = DirectoryMember {
            email: user.primary_email.clone(),
            role
        };
        self.directory.add_group_member(group_key, member).await?;
        Ok(())
    }

    /// Fetch-or-create for a remote group, including default settings and
    /// initial membership for a newly created group, and un-archival repair
    /// for a group that already exists but was soft-deleted earlier.
    pub async fn create_group_if_necessary(
        &self,
        registry_group: &RegistryGroup
    ) -> ConnectorResult<()> {
        let group_key = self
            .address_formatter
            .qualify_group_address(&registry_group.name);

        if self.fetch_directory_group(&group_key).await.is_none() {
            let new_group = DirectoryGroup {
                email: group_key.clone(),
                name: registry_group.display_name.clone(),
                description: registry_group.description.clone(),
                created_at: None
            };
            let created = self.directory.add_group(new_group).await?;
            self.caches.put_group(created).await;
            info!(connector = %self.name, group = %group_key, "created directory group");

            let mut settings = self.directory.retrieve_group_settings(&group_key).await?;
            settings.apply(&self.config.default_group_settings);
            self.directory
                .update_group_settings(&group_key, settings)
                .await?;

            for member in self.registry.group_members(&registry_group.name).await? {
                if member.member_type != MemberType::Person {
                    continue;
                }
                let Some(subject) = self
                    .fetch_subject(&member.source_id, &member.subject_id)
                    .await
                else {
                    warn!(
                        connector = %self.name,
                        subject = %member.subject_id,
                        source = %member.source_id,
                        "member subject not resolvable, skipping"
                    );
                    continue;
                };

                let user_key = self.address_formatter.qualify_subject_address(&subject.id);
                let user = match self.fetch_directory_user(&user_key).await {
                    Some(user) => Some(user),
                    None => self.create_user(&subject).await?
                };

                if let Some(user) = user {
                    self.create_member(&group_key, &user, MemberRole::Member)
                        .await?;
                }
            }
        } else {
            // The group may have been archived by an earlier deletion with
            // the archive policy; recreating it means bringing it back.
            let settings = self.directory.retrieve_group_settings(&group_key).await?;
            if settings.archive_only() {
                let mut updated = settings;
                updated.set_archive_only(false);
                self.directory
                    .update_group_settings(&group_key, updated)
                    .await?;
                info!(connector = %self.name, group = %group_key, "re-activated archived group");
            }
        }

        Ok(())
    }

    /// Applies the configured deletion policy remotely and drops the group
    /// from the local caches and the decision cache: the node is gone, so
    /// its memoized eligibility no longer holds.
    pub async fn delete_group(&self, group_name: &str) -> ConnectorResult<()> {
        let group_key = self.address_formatter.qualify_group_address(group_name);

        match self.config.deleted_group_policy {
            DeletedGroupPolicy::Archive => {
                let mut settings = self.directory.retrieve_group_settings(&group_key).await?;
                settings.set_archive_only(true);
                self.directory
                    .update_group_settings(&group_key, settings)
                    .await?;
                info!(connector = %self.name, group = %group_key, "archived directory group");
            }
            DeletedGroupPolicy::Delete => {
                self.directory.remove_group(&group_key).await?;
                self.caches.remove_group(&group_key).await;
                info!(connector = %self.name, group = %group_key, "removed directory group");
            }
            DeletedGroupPolicy::Ignore => {
                debug!(connector = %self.name, group = %group_key, "deletion policy is ignore");
            }
        }

        self.registry_groups.write().await.remove(group_name);
        self.resolver.forget(group_name).await;
        Ok(())
    }

    pub async fn remove_membership(
        &self,
        group_name: &str,
        subject: &Subject
    ) -> ConnectorResult<()> {
        let group_key = self.address_formatter.qualify_group_address(group_name);
        let user_key = self.address_formatter.qualify_subject_address(&subject.id);

        self.directory
            .remove_group_member(&group_key, &user_key)
            .await?;

        if self.config.deprovision_users {
            // TODO: audit the subject's remaining memberships and remove the
            // account when none are left. Until then deprovisioning only
            // removes the membership itself.
            debug!(
                connector = %self.name,
                user = %user_key,
                "deprovisioning requested but the membership audit is not implemented"
            );
        }

        Ok(())
    }

    pub async fn update_group(
        &self,
        group_key: &str,
        group: DirectoryGroup
    ) -> ConnectorResult<DirectoryGroup> {
        let updated = self.directory.update_group(group_key, group).await?;
        self.caches.put_group(updated.clone()).await;
        Ok(updated)
    }

    pub async fn group_members(&self, group_key: &str) -> ConnectorResult<Vec<DirectoryMember>> {
        Ok(self.directory.retrieve_group_members(group_key).await?)
    }

    pub async fn should_sync_group(&self, group: &RegistryGroup) -> ConnectorResult<bool> {
        Ok(self.resolver.should_sync_group(group).await?)
    }

    pub async fn should_sync_stem(&self, stem: &Stem) -> ConnectorResult<bool> {
        Ok(self.resolver.should_sync_stem(&stem.name).await?)
    }

    pub async fn cache_synced_objects(&self, fully_populate: bool) -> ConnectorResult<()> {
        Ok(self.resolver.cache_synced_objects(fully_populate).await?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address_formatter(&self) -> &AddressFormatter {
        &self.address_formatter
    }

    /// Snapshot of the sync decision cache, for diagnostics.
    pub async fn synced_decisions(&self) -> HashMap<String, bool> {
        self.resolver.decisions().await
    }
}

/// Throwaway credential for a freshly provisioned account.
fn generate_password() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
