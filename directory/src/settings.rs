use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Group settings bundle.
///
/// The remote service exposes a few dozen per-group settings (posting
/// permissions, moderation levels, visibility, ...). The connector never
/// interprets most of them: configured defaults are overlaid onto whatever
/// the remote reports and sent back verbatim. Only the archival flag is
/// dispatched on, so it is the one key with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSettings {
    values: Map<String, Value>
}

const ARCHIVE_ONLY: &str = "archiveOnly";

impl GroupSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Overlay every key of `other` onto this bundle, replacing existing
    /// values and leaving keys absent from `other` untouched.
    pub fn apply(&mut self, other: &GroupSettings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the group is archived (soft-deleted but still addressable).
    ///
    /// The remote service reports the flag as the string "true"/"false".
    pub fn archive_only(&self) -> bool {
        match self.values.get(ARCHIVE_ONLY) {
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(Value::Bool(b)) => *b,
            _ => false
        }
    }

    pub fn set_archive_only(&mut self, archived: bool) {
        let value = if archived { "true" } else { "false" };
        self.values.insert(ARCHIVE_ONLY.to_string(), Value::String(value.to_string()));
    }
}
