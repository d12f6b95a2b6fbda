use directory::GroupSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Remote directory domain that qualified addresses live under.
    pub domain: String,

    #[serde(default = "default_identifier_expression")]
    pub group_identifier_expression: String,

    #[serde(default = "default_identifier_expression")]
    pub subject_identifier_expression: String,

    #[serde(default = "default_directory_cache_validity_secs")]
    pub directory_group_cache_validity_secs: u64,

    #[serde(default = "default_directory_cache_validity_secs")]
    pub directory_user_cache_validity_secs: u64,

    /// Validity of the per-instance registry caches. Local lookups are
    /// cheap, so this window is short.
    #[serde(default = "default_registry_cache_validity_secs")]
    pub registry_cache_validity_secs: u64,

    #[serde(default)]
    pub provision_users: bool,

    #[serde(default)]
    pub deprovision_users: bool,

    #[serde(default = "default_true")]
    pub include_user_in_global_address_list: bool,

    /// When set, given/family names are derived by splitting the subject's
    /// display name on whitespace; otherwise the attribute fields below are
    /// consulted.
    #[serde(default = "default_true")]
    pub use_simple_subject_naming: bool,

    #[serde(default = "default_given_name_field")]
    pub subject_given_name_field: String,

    #[serde(default = "default_surname_field")]
    pub subject_surname_field: String,

    /// Settings bundle applied verbatim to newly created remote groups.
    #[serde(default)]
    pub default_group_settings: GroupSettings,

    #[serde(default)]
    pub deleted_group_policy: DeletedGroupPolicy
}

/// What to do remotely when a group is deleted in the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletedGroupPolicy {
    /// Soft delete: the remote group is marked archived but stays
    /// addressable and can be re-activated.
    #[default]
    Archive,
    /// Remove the remote group outright.
    Delete,
    /// Leave the remote group untouched.
    Ignore
}

fn default_identifier_expression() -> String {
    crate::address::ID_TOKEN.to_string()
}

fn default_directory_cache_validity_secs() -> u64 {
    30 * 60
}

fn default_registry_cache_validity_secs() -> u64 {
    5 * 60
}

fn default_true() -> bool {
    true
}

fn default_given_name_field() -> String {
    "givenName".to_string()
}

fn default_surname_field() -> String {
    "sn".to_string()
}

impl ConnectorConfig {
    pub fn directory_group_cache_validity(&self) -> Duration {
        Duration::from_secs(self.directory_group_cache_validity_secs)
    }

    pub fn directory_user_cache_validity(&self) -> Duration {
        Duration::from_secs(self.directory_user_cache_validity_secs)
    }

    pub fn registry_cache_validity(&self) -> Duration {
        Duration::from_secs(self.registry_cache_validity_secs)
    }
}
