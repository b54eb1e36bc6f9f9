//! Managed contact groups and the per-run group index

use super::{ContactGroup, GroupId};
use std::collections::{BTreeSet, HashMap};

/// A contact group owned by the sync, with the emails of its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedGroup {
    pub id: GroupId,
    pub name: String,
    /// Validated member emails, deduplicated and sorted
    pub emails: BTreeSet<String>,
}

impl ManagedGroup {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            emails: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Managed groups in discovery order, addressable by group id and by name
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<ManagedGroup>,
    by_id: HashMap<GroupId, usize>,
    by_name: HashMap<String, usize>,
}

impl GroupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the groups whose name carries the managed prefix.
    ///
    /// Groups sharing a name collapse into one entry reachable from every id.
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a ContactGroup>, prefix: &str) -> Self {
        let mut index = Self::new();
        for group in groups {
            if group.name.starts_with(prefix) {
                index.insert(group);
            }
        }
        index
    }

    fn insert(&mut self, group: &ContactGroup) {
        let position = match self.by_name.get(&group.name) {
            Some(&position) => position,
            None => {
                self.groups
                    .push(ManagedGroup::new(group.id.clone(), group.name.clone()));
                let position = self.groups.len() - 1;
                self.by_name.insert(group.name.clone(), position);
                position
            }
        };
        self.by_id.insert(group.id.clone(), position);
    }

    /// Add a member email to the group with `id`; false if the group is not managed
    pub fn add_email(&mut self, id: &GroupId, email: &str) -> bool {
        match self.by_id.get(id) {
            Some(&position) => {
                self.groups[position].emails.insert(email.to_string());
                true
            }
            None => false,
        }
    }

    pub fn contains_id(&self, id: &GroupId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn name_for_id(&self, id: &GroupId) -> Option<&str> {
        self.by_id
            .get(id)
            .map(|&position| self.groups[position].name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ManagedGroup> {
        self.by_name.get(name).map(|&position| &self.groups[position])
    }

    /// Groups in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &ManagedGroup> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
