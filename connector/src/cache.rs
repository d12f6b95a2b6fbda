//! TTL-bounded entity caches.
//!
//! Remote directory lookups are rate-limited and slow, so cached entries are
//! returned regardless of their individual age; staleness is handled at the
//! whole-cache level (`is_expired`), which callers use to decide when to
//! reseed from a full enumeration.

use directory::{DirectoryGroup, DirectoryUser};
use registry::{RegistryGroup, Subject};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Separator between source id and subject id in the subject cache key.
pub const SUBJECT_KEY_SEPARATOR: &str = "__";

pub fn subject_key(source_id: &str, subject_id: &str) -> String {
    format!("{source_id}{SUBJECT_KEY_SEPARATOR}{subject_id}")
}

/// Supplies the identifying cache key of an entity.
pub trait Keyed {
    fn cache_key(&self) -> String;
}

impl Keyed for DirectoryGroup {
    fn cache_key(&self) -> String {
        self.email.clone()
    }
}

impl Keyed for DirectoryUser {
    fn cache_key(&self) -> String {
        self.primary_email.clone()
    }
}

impl Keyed for RegistryGroup {
    fn cache_key(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for Subject {
    fn cache_key(&self) -> String {
        subject_key(&self.source_id, &self.id)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant
}

/// Key-value cache for one entity population.
///
/// Entries are replaced whole on `put` and never evicted on read; a cache
/// that has never been seeded reports itself expired so the first
/// population pass runs unconditionally.
#[derive(Debug)]
pub struct EntityCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    validity: Duration,
    seeded_at: Option<Instant>
}

impl<V: Keyed + Clone> EntityCache<V> {
    pub fn new(validity: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            validity,
            seeded_at: None
        }
    }

    pub fn set_validity(&mut self, validity: Duration) {
        self.validity = validity;
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Bulk-load a full population, replacing all current entries and
    /// resetting the whole-cache expiry clock.
    pub fn seed<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>
    {
        let now = Instant::now();
        self.entries = values
            .into_iter()
            .map(|value| {
                (
                    value.cache_key(),
                    CacheEntry {
                        value,
                        inserted_at: now
                    }
                )
            })
            .collect();
        self.seeded_at = Some(now);
    }

    /// Mark the cache freshly populated without loading anything, pre-sizing
    /// storage for the expected population.
    pub fn seed_empty(&mut self, capacity_hint: usize) {
        self.entries = HashMap::with_capacity(capacity_hint);
        self.seeded_at = Some(Instant::now());
    }

    /// Returns the cached value if present, regardless of entry age.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn put(&mut self, value: V) {
        let key = value.cache_key();
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now()
            }
        );
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Whole-cache staleness: true when the cache was never seeded or the
    /// last full population is older than the configured validity.
    pub fn is_expired(&self) -> bool {
        match self.seeded_at {
            Some(seeded_at) => seeded_at.elapsed() >= self.validity,
            None => true
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insertion timestamp of an entry, for diagnostics.
    pub fn inserted_at(&self, key: &str) -> Option<Instant> {
        self.entries.get(key).map(|entry| entry.inserted_at)
    }
}

/// Shared holder of the remote-entity caches.
///
/// The remote directory is one external system no matter how many connector
/// instances are running, so exactly one group cache and one user cache are
/// shared process-wide via `Arc`. All mutation goes through these methods;
/// concurrent instances get last-writer-wins semantics, which is acceptable
/// because remote fetches are idempotent.
#[derive(Debug)]
pub struct DirectoryCacheService {
    groups: RwLock<EntityCache<DirectoryGroup>>,
    users: RwLock<EntityCache<DirectoryUser>>
}

const DEFAULT_VALIDITY: Duration = Duration::from_secs(30 * 60);

impl DirectoryCacheService {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(EntityCache::new(DEFAULT_VALIDITY)),
            users: RwLock::new(EntityCache::new(DEFAULT_VALIDITY))
        }
    }

    pub async fn set_group_validity(&self, validity: Duration) {
        self.groups.write().await.set_validity(validity);
    }

    pub async fn set_user_validity(&self, validity: Duration) {
        self.users.write().await.set_validity(validity);
    }

    pub async fn group(&self, key: &str) -> Option<DirectoryGroup> {
        self.groups.read().await.get(key)
    }

    pub async fn put_group(&self, group: DirectoryGroup) {
        self.groups.write().await.put(group);
    }

    pub async fn remove_group(&self, key: &str) {
        self.groups.write().await.remove(key);
    }

    pub async fn seed_groups<I>(&self, groups: I)
    where
        I: IntoIterator<Item = DirectoryGroup>
    {
        let mut cache = self.groups.write().await;
        cache.seed(groups);
        debug!(count = cache.len(), "seeded directory group cache");
    }

    pub async fn groups_expired(&self) -> bool {
        self.groups.read().await.is_expired()
    }

    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    pub async fn user(&self, key: &str) -> Option<DirectoryUser> {
        self.users.read().await.get(key)
    }

    pub async fn put_user(&self, user: DirectoryUser) {
        self.users.write().await.put(user);
    }

    pub async fn remove_user(&self, key: &str) {
        self.users.write().await.remove(key);
    }

    pub async fn seed_users<I>(&self, users: I)
    where
        I: IntoIterator<Item = DirectoryUser>
    {
        let mut cache = self.users.write().await;
        cache.seed(users);
        debug!(count = cache.len(), "seeded directory user cache");
    }

    pub async fn users_expired(&self) -> bool {
        self.users.read().await.is_expired()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl Default for DirectoryCacheService {
    fn default() -> Self {
        Self::new()
    }
}
