//! Sync engine reconciling contact groups with mail labels and filters
//!
//! Every run reads both remotes fresh and can be safely retried.

mod engine;
mod filters;
mod groups;
mod labels;
mod pagination;

pub use engine::{SyncStats, sync_groups};
pub use filters::{
    DesiredFilter, DesiredState, FilterStats, MissingLabelError, delete_filters, desired_filters,
    managed_filters, reconcile_filters,
};
pub use groups::{MembershipStats, extract_groups, populate_members};
pub use labels::reconcile_labels;
pub use pagination::collect_pages;
