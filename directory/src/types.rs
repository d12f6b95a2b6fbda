use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A group in the remote directory, keyed by its primary address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryGroup {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>
}

impl DirectoryGroup {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            description: String::new(),
            created_at: None
        }
    }
}

/// A user account in the remote directory, keyed by its primary address.
///
/// The password is write-only: it is set when the account is created and
/// never returned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub primary_email: String,
    pub name: UserName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub include_in_global_address_list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub full_name: String
}

/// A membership record inside a remote group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryMember {
    pub email: String,
    pub role: MemberRole
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Member,
    Manager,
    Owner
}
