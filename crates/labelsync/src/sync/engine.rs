//! One full reconciliation run

use anyhow::Result;
use log::info;

use super::filters::{FilterStats, reconcile_filters};
use super::groups::{MembershipStats, extract_groups};
use super::labels::reconcile_labels;
use crate::config::SyncConfig;
use crate::remote::{ContactsDirectory, MailSettings};

/// Statistics from a sync run
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Managed contact groups found
    pub groups: usize,
    /// Membership population counters
    pub members: MembershipStats,
    /// Labels created for groups that had none
    pub labels_created: usize,
    /// Filter reconciliation counters
    pub filters: FilterStats,
    /// Duration of the run
    pub duration_ms: u64,
}

/// Reconcile mail labels and filters with the managed contact groups.
///
/// Phases run strictly in order: groups, labels, filters. Nothing is rolled
/// back on failure; running again converges.
///
/// # Arguments
/// * `directory` - Contacts directory to read groups and connections from
/// * `mail` - Mail settings to reconcile
/// * `config` - Naming convention and paging settings
pub fn sync_groups(
    directory: &dyn ContactsDirectory,
    mail: &dyn MailSettings,
    config: &SyncConfig,
) -> Result<SyncStats> {
    let start = std::time::Instant::now();
    let mut stats = SyncStats::default();

    let (groups, members) = extract_groups(directory, config)?;
    stats.groups = groups.len();
    stats.members = members;

    let (labels, created) = reconcile_labels(mail, &groups, config)?;
    stats.labels_created = created;

    stats.filters = reconcile_filters(mail, &groups, &labels, config)?;

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Synced {} groups: {} labels created, {} filters replaced by {} in {}ms",
        stats.groups,
        stats.labels_created,
        stats.filters.deleted + stats.filters.already_deleted,
        stats.filters.created,
        stats.duration_ms
    );
    Ok(stats)
}
