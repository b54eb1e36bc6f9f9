//! Mail labels and the managed-label index

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a label (Gmail label ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Gmail system label for spam classification
    pub const SPAM: &'static str = "SPAM";

    /// The spam label as an id value
    pub fn spam() -> Self {
        Self::new(Self::SPAM)
    }
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A mail label as listed by the mail system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID (e.g. "SPAM", "Label_123")
    pub id: LabelId,
    /// Display name
    pub name: String,
}

impl Label {
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Bidirectional index over managed labels.
///
/// Filters reference labels by id while groups are matched to labels by
/// name, so both directions are kept in step.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    by_id: HashMap<LabelId, String>,
    by_name: HashMap<String, LabelId>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a full label listing, keeping names with the managed prefix
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a Label>, prefix: &str) -> Self {
        let mut index = Self::new();
        for label in labels {
            if label.name.starts_with(prefix) {
                index.insert(label.id.clone(), label.name.clone());
            }
        }
        index
    }

    /// Record a label in both directions
    pub fn insert(&mut self, id: LabelId, name: String) {
        self.by_name.insert(name.clone(), id.clone());
        self.by_id.insert(id, name);
    }

    pub fn id_for_name(&self, name: &str) -> Option<&LabelId> {
        self.by_name.get(name)
    }

    pub fn name_for_id(&self, id: &LabelId) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn contains_id(&self, id: &LabelId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Managed labels sorted by name, for logging
    pub fn sorted(&self) -> Vec<(&str, &LabelId)> {
        let mut entries: Vec<_> = self
            .by_name
            .iter()
            .map(|(name, id)| (name.as_str(), id))
            .collect();
        entries.sort();
        entries
    }
}
