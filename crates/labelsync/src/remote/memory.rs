//! In-memory remotes
//!
//! Behave like the Google endpoints as far as the sync can observe: paged
//! connections, remote-assigned ids, unique label names, and not-found
//! errors on deleting an absent filter. Used by the tests.

use anyhow::{Result, bail};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ContactsDirectory, MailSettings, NotFoundError, Page};
use crate::models::{Connection, ContactGroup, Filter, FilterId, FilterSpec, Label, LabelId};

/// In-memory contacts directory
#[derive(Default)]
pub struct InMemoryContacts {
    groups: RwLock<Vec<ContactGroup>>,
    connections: RwLock<Vec<Connection>>,
}

impl InMemoryContacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, group: ContactGroup) {
        self.groups.write().unwrap().push(group);
    }

    pub fn add_connection(&self, connection: Connection) {
        self.connections.write().unwrap().push(connection);
    }

    /// Replace every connection, e.g. after a member left a group
    pub fn set_connections(&self, connections: Vec<Connection>) {
        *self.connections.write().unwrap() = connections;
    }
}

impl ContactsDirectory for InMemoryContacts {
    fn list_groups(&self) -> Result<Vec<ContactGroup>> {
        Ok(self.groups.read().unwrap().clone())
    }

    fn list_connections(
        &self,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Page<Connection>> {
        let connections = self.connections.read().unwrap();
        let start = match page_token {
            Some(token) => token.parse::<usize>()?,
            None => 0,
        };
        let end = (start + page_size.max(1)).min(connections.len());
        let items = connections.get(start..end).unwrap_or_default().to_vec();

        Ok(Page {
            items,
            total_items: Some(connections.len()),
            next_page_token: (end < connections.len()).then(|| end.to_string()),
        })
    }
}

/// In-memory mail label and filter settings
pub struct InMemoryMail {
    labels: RwLock<Vec<Label>>,
    filters: RwLock<Vec<Filter>>,
    next_id: AtomicU64,
}

impl InMemoryMail {
    /// Create a mailbox holding the system spam label
    pub fn new() -> Self {
        Self {
            labels: RwLock::new(vec![Label::new(LabelId::SPAM, LabelId::SPAM)]),
            filters: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Add an existing label, keeping the given id
    pub fn add_label(&self, label: Label) {
        self.labels.write().unwrap().push(label);
    }

    /// Add an existing filter, keeping the given id
    pub fn add_filter(&self, filter: Filter) {
        self.filters.write().unwrap().push(filter);
    }

    pub fn labels(&self) -> Vec<Label> {
        self.labels.read().unwrap().clone()
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.filters.read().unwrap().clone()
    }

    pub fn label_named(&self, name: &str) -> Option<Label> {
        self.labels
            .read()
            .unwrap()
            .iter()
            .find(|l| l.name == name)
            .cloned()
    }

    /// Filters adding the given label
    pub fn filters_for_label(&self, id: &LabelId) -> Vec<Filter> {
        self.filters
            .read()
            .unwrap()
            .iter()
            .filter(|f| f.action.add_label_ids.contains(id))
            .cloned()
            .collect()
    }
}

impl Default for InMemoryMail {
    fn default() -> Self {
        Self::new()
    }
}

impl MailSettings for InMemoryMail {
    fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(self.labels())
    }

    fn create_label(&self, name: &str) -> Result<Label> {
        let mut labels = self.labels.write().unwrap();
        if labels.iter().any(|l| l.name == name) {
            bail!("Label name exists or conflicts: {}", name);
        }
        let label = Label::new(self.next_id("Label"), name);
        labels.push(label.clone());
        Ok(label)
    }

    fn list_filters(&self) -> Result<Vec<Filter>> {
        Ok(self.filters())
    }

    fn delete_filter(&self, id: &FilterId) -> Result<()> {
        let mut filters = self.filters.write().unwrap();
        let before = filters.len();
        filters.retain(|f| &f.id != id);
        if filters.len() == before {
            return Err(NotFoundError::filter(id).into());
        }
        Ok(())
    }

    fn create_filter(&self, spec: &FilterSpec) -> Result<Filter> {
        let filter = Filter::new(self.next_id("Filter"), spec.clone());
        self.filters.write().unwrap().push(filter.clone());
        Ok(filter)
    }
}
