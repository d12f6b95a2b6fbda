use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Separator between levels of the registry namespace tree.
pub const TREE_SEPARATOR: &str = ":";

/// Name of the parent of a tree node, or `None` for the root (empty name).
///
/// A top-level node's parent is the root.
pub fn parent_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    match name.rsplit_once(TREE_SEPARATOR) {
        Some((parent, _)) => Some(parent.to_string()),
        None => Some(String::new())
    }
}

/// An organizational unit in the registry namespace tree.
///
/// Stems are named by their full path ("science:physics"); the root stem
/// has the empty name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stem {
    pub id: Uuid,
    pub name: String,
    pub display_name: String
}

impl Stem {
    pub fn root() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            display_name: String::new()
        }
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Name of the parent stem, or `None` for the root.
    pub fn parent_name(&self) -> Option<String> {
        parent_name(&self.name)
    }
}

/// A group in the source registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryGroup {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: String
}

impl RegistryGroup {
    /// Name of the stem this group lives in (empty for a root-level group).
    pub fn parent_stem_name(&self) -> String {
        match self.name.rsplit_once(TREE_SEPARATOR) {
            Some((parent, _)) => parent.to_string(),
            None => String::new()
        }
    }

    /// Last segment of the group name.
    pub fn extension(&self) -> &str {
        match self.name.rsplit_once(TREE_SEPARATOR) {
            Some((_, ext)) => ext,
            None => &self.name
        }
    }
}

/// A subject (person or other principal) resolved from a subject source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub source_id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>
}

impl Subject {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|v| v.as_str())
    }
}

/// A direct member of a registry group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub subject_id: String,
    pub source_id: String,
    pub member_type: MemberType
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    Person,
    Group
}

/// Identifier of the sync-enabled marker attribute.
///
/// The marker itself is created and assigned in the registry by external
/// tooling; the connector only reads assignments of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMarker(pub Uuid);

/// Scope for child-group enumeration under a stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemScope {
    /// Immediate children only.
    One,
    /// All descendants.
    Sub
}
