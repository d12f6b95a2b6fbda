//! In-memory fakes for the collaborator traits, with call recording so
//! tests can assert how many remote round-trips an operation performed.

use async_trait::async_trait;
use directory::{
    DirectoryClient, DirectoryError, DirectoryGroup, DirectoryMember, DirectoryResult,
    DirectoryUser, GroupSettings
};
use registry::{
    GroupMember, RegistryClient, RegistryGroup, RegistryResult, Stem, StemScope, Subject,
    SyncMarker
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

#[derive(Default)]
pub struct FakeDirectory {
    pub users: Mutex<HashMap<String, DirectoryUser>>,
    pub groups: Mutex<HashMap<String, DirectoryGroup>>,
    pub members: Mutex<HashMap<String, Vec<DirectoryMember>>>,
    pub settings: Mutex<HashMap<String, GroupSettings>>,
    pub fail_reads: AtomicBool,
    calls: Mutex<Vec<String>>
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, group: DirectoryGroup) -> Self {
        self.groups
            .lock()
            .unwrap()
            .insert(group.email.clone(), group);
        self
    }

    pub fn with_user(self, user: DirectoryUser) -> Self {
        self.users
            .lock()
            .unwrap()
            .insert(user.primary_email.clone(), user);
        self
    }

    fn record(&self, operation: &str, key: &str) {
        self.calls.lock().unwrap().push(format!("{operation}:{key}"));
    }

    pub fn call_count(&self, operation: &str) -> usize {
        let prefix = format!("{operation}:");
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count()
    }

    fn check_reads(&self) -> DirectoryResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(DirectoryError::Transport {
                message: "connection reset by peer".to_string()
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn retrieve_all_users(&self) -> DirectoryResult<Vec<DirectoryUser>> {
        self.record("retrieve_all_users", "*");
        self.check_reads()?;
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn retrieve_all_groups(&self) -> DirectoryResult<Vec<DirectoryGroup>> {
        self.record("retrieve_all_groups", "*");
        self.check_reads()?;
        Ok(self.groups.lock().unwrap().values().cloned().collect())
    }

    async fn retrieve_user(&self, user_key: &str) -> DirectoryResult<DirectoryUser> {
        self.record("retrieve_user", user_key);
        self.check_reads()?;
        self.users
            .lock()
            .unwrap()
            .get(user_key)
            .cloned()
            .ok_or_else(|| DirectoryError::UserNotFound {
                key: user_key.to_string()
            })
    }

    async fn retrieve_group(&self, group_key: &str) -> DirectoryResult<DirectoryGroup> {
        self.record("retrieve_group", group_key);
        self.check_reads()?;
        self.groups
            .lock()
            .unwrap()
            .get(group_key)
            .cloned()
            .ok_or_else(|| DirectoryError::GroupNotFound {
                key: group_key.to_string()
            })
    }

    async fn add_user(&self, user: DirectoryUser) -> DirectoryResult<DirectoryUser> {
        self.record("add_user", &user.primary_email);
        self.users
            .lock()
            .unwrap()
            .insert(user.primary_email.clone(), user.clone());
        Ok(user)
    }

    async fn add_group(&self, group: DirectoryGroup) -> DirectoryResult<DirectoryGroup> {
        self.record("add_group", &group.email);
        self.groups
            .lock()
            .unwrap()
            .insert(group.email.clone(), group.clone());
        Ok(group)
    }

    async fn update_group(
        &self,
        group_key: &str,
        group: DirectoryGroup
    ) -> DirectoryResult<DirectoryGroup> {
        self.record("update_group", group_key);
        self.groups
            .lock()
            .unwrap()
            .insert(group_key.to_string(), group.clone());
        Ok(group)
    }

    async fn remove_group(&self, group_key: &str) -> DirectoryResult<()> {
        self.record("remove_group", group_key);
        self.groups.lock().unwrap().remove(group_key);
        self.members.lock().unwrap().remove(group_key);
        self.settings.lock().unwrap().remove(group_key);
        Ok(())
    }

    async fn add_group_member(
        &self,
        group_key: &str,
        member: DirectoryMember
    ) -> DirectoryResult<DirectoryMember> {
        self.record("add_group_member", group_key);
        self.members
            .lock()
            .unwrap()
            .entry(group_key.to_string())
            .or_default()
            .push(member.clone());
        Ok(member)
    }

    async fn remove_group_member(&self, group_key: &str, user_key: &str) -> DirectoryResult<()> {
        self.record("remove_group_member", group_key);
        let mut members = self.members.lock().unwrap();
        if let Some(list) = members.get_mut(group_key) {
            list.retain(|m| m.email != user_key);
        }
        Ok(())
    }

    async fn retrieve_group_members(
        &self,
        group_key: &str
    ) -> DirectoryResult<Vec<DirectoryMember>> {
        self.record("retrieve_group_members", group_key);
        self.check_reads()?;
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(group_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn retrieve_group_settings(&self, group_key: &str) -> DirectoryResult<GroupSettings> {
        self.record("retrieve_group_settings", group_key);
        self.check_reads()?;
        if !self.groups.lock().unwrap().contains_key(group_key) {
            return Err(DirectoryError::GroupNotFound {
                key: group_key.to_string()
            });
        }
        Ok(self
            .settings
            .lock()
            .unwrap()
            .get(group_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_group_settings(
        &self,
        group_key: &str,
        settings: GroupSettings
    ) -> DirectoryResult<GroupSettings> {
        self.record("update_group_settings", group_key);
        self.settings
            .lock()
            .unwrap()
            .insert(group_key.to_string(), settings.clone());
        Ok(settings)
    }
}

#[derive(Default)]
pub struct FakeRegistry {
    pub groups: Mutex<HashMap<String, RegistryGroup>>,
    pub subjects: Mutex<HashMap<String, Subject>>,
    pub members: Mutex<HashMap<String, Vec<GroupMember>>>,
    pub stem_markers: Mutex<HashSet<String>>,
    pub group_markers: Mutex<HashSet<String>>
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, group: RegistryGroup) {
        self.groups.lock().unwrap().insert(group.name.clone(), group);
    }

    pub fn add_subject(&self, subject: Subject) {
        let key = format!("{}__{}", subject.source_id, subject.id);
        self.subjects.lock().unwrap().insert(key, subject);
    }

    pub fn add_member(&self, group_name: &str, member: GroupMember) {
        self.members
            .lock()
            .unwrap()
            .entry(group_name.to_string())
            .or_default()
            .push(member);
    }

    pub fn mark_group(&self, name: &str) {
        self.group_markers.lock().unwrap().insert(name.to_string());
    }

    pub fn unmark_group(&self, name: &str) {
        self.group_markers.lock().unwrap().remove(name);
    }

    pub fn mark_stem(&self, name: &str) {
        self.stem_markers.lock().unwrap().insert(name.to_string());
    }

    fn stem(name: &str) -> Stem {
        Stem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            display_name: name.to_string()
        }
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn find_group(&self, name: &str) -> RegistryResult<Option<RegistryGroup>> {
        Ok(self.groups.lock().unwrap().get(name).cloned())
    }

    async fn find_stem(&self, name: &str) -> RegistryResult<Option<Stem>> {
        Ok(Some(Self::stem(name)))
    }

    async fn find_subject(
        &self,
        source_id: &str,
        subject_id: &str
    ) -> RegistryResult<Option<Subject>> {
        let key = format!("{source_id}__{subject_id}");
        Ok(self.subjects.lock().unwrap().get(&key).cloned())
    }

    async fn group_has_marker(
        &self,
        group_name: &str,
        _marker: &SyncMarker
    ) -> RegistryResult<bool> {
        Ok(self.group_markers.lock().unwrap().contains(group_name))
    }

    async fn stem_has_marker(&self, stem_name: &str, _marker: &SyncMarker) -> RegistryResult<bool> {
        Ok(self.stem_markers.lock().unwrap().contains(stem_name))
    }

    async fn stems_with_marker(&self, _marker: &SyncMarker) -> RegistryResult<Vec<Stem>> {
        let markers = self.stem_markers.lock().unwrap();
        Ok(markers.iter().map(|n| Self::stem(n)).collect())
    }

    async fn groups_with_marker(&self, _marker: &SyncMarker) -> RegistryResult<Vec<RegistryGroup>> {
        let markers = self.group_markers.lock().unwrap();
        let groups = self.groups.lock().unwrap();
        Ok(markers
            .iter()
            .filter_map(|n| groups.get(n).cloned())
            .collect())
    }

    async fn child_groups(
        &self,
        stem_name: &str,
        _scope: StemScope
    ) -> RegistryResult<Vec<RegistryGroup>> {
        let prefix = format!("{stem_name}:");
        let groups = self.groups.lock().unwrap();
        Ok(groups
            .values()
            .filter(|g| stem_name.is_empty() || g.name.starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn group_members(&self, group_name: &str) -> RegistryResult<Vec<GroupMember>> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(group_name)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn registry_group(name: &str, display_name: &str) -> RegistryGroup {
    RegistryGroup {
        id: Uuid::new_v4(),
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: format!("{display_name} (synced)")
    }
}

pub fn person(source_id: &str, id: &str, name: &str) -> Subject {
    Subject {
        id: id.to_string(),
        source_id: source_id.to_string(),
        name: name.to_string(),
        attributes: HashMap::new()
    }
}

pub fn person_member(source_id: &str, id: &str) -> GroupMember {
    GroupMember {
        subject_id: id.to_string(),
        source_id: source_id.to_string(),
        member_type: registry::MemberType::Person
    }
}
