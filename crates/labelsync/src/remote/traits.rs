//! Contracts for the two remote systems the sync reconciles

use crate::models::{Connection, ContactGroup, Filter, FilterId, FilterSpec, Label};
use anyhow::Result;

/// Error indicating the addressed remote object no longer exists
#[derive(Debug, thiserror::Error)]
#[error("{kind} {id} not found")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub id: String,
}

impl NotFoundError {
    pub fn filter(id: &FilterId) -> Self {
        Self {
            kind: "filter",
            id: id.as_str().to_string(),
        }
    }
}

/// One page of a cursor-paged listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total item count across all pages, when the remote reports it
    pub total_items: Option<usize>,
    pub next_page_token: Option<String>,
}

/// Read access to the contacts directory
///
/// Implementations must be shareable across the fan-out worker threads.
pub trait ContactsDirectory: Send + Sync {
    /// List all contact groups (single call)
    fn list_groups(&self) -> Result<Vec<ContactGroup>>;

    /// List one page of the user's connections
    fn list_connections(
        &self,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<Page<Connection>>;
}

/// Label and filter settings of the mail system
pub trait MailSettings: Send + Sync {
    /// List all labels
    fn list_labels(&self) -> Result<Vec<Label>>;

    /// Create a label with exactly `name`
    fn create_label(&self, name: &str) -> Result<Label>;

    /// List all filters
    fn list_filters(&self) -> Result<Vec<Filter>>;

    /// Delete a filter
    ///
    /// # Errors
    /// Returns `NotFoundError` if the filter is already gone
    fn delete_filter(&self, id: &FilterId) -> Result<()>;

    /// Create a filter
    fn create_filter(&self, spec: &FilterSpec) -> Result<Filter>;
}
