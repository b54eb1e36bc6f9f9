//! Managed group discovery and membership population

use anyhow::{Context, Result};
use log::{debug, info, trace};

use super::pagination::collect_pages;
use crate::config::SyncConfig;
use crate::models::{Connection, EmailCheck, GroupIndex};
use crate::remote::ContactsDirectory;

/// Counters from populating group members
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MembershipStats {
    /// Connections read from the directory
    pub connections: usize,
    /// Emails added to a managed group
    pub emails_added: usize,
    /// Email entries that failed validation
    pub invalid_emails: usize,
    /// Email entries without a value
    pub absent_emails: usize,
}

/// Build the index of managed groups with their member emails
pub fn extract_groups(
    directory: &dyn ContactsDirectory,
    config: &SyncConfig,
) -> Result<(GroupIndex, MembershipStats)> {
    info!("Get all managed contact groups");
    let groups = directory
        .list_groups()
        .context("Failed to list contact groups")?;
    let mut index = GroupIndex::from_groups(&groups, &config.prefix);
    debug!(
        "{} of {} contact groups are managed: {:?}",
        index.len(),
        groups.len(),
        index.names().collect::<Vec<_>>()
    );

    info!("Populate contents of all managed contact groups");
    let connections = collect_pages(config.page_size, |page_size, token| {
        directory.list_connections(page_size, token)
    })
    .context("Failed to list connections")?;
    let stats = populate_members(&mut index, &connections);

    for group in index.iter() {
        debug!("{} ({}): {:?}", group.name, group.id.as_str(), group.emails);
    }
    Ok((index, stats))
}

/// Add each connection's valid emails to every managed group it belongs to
pub fn populate_members(index: &mut GroupIndex, connections: &[Connection]) -> MembershipStats {
    let mut stats = MembershipStats {
        connections: connections.len(),
        ..Default::default()
    };

    for connection in connections {
        for group_id in connection.group_ids() {
            if !index.contains_id(group_id) {
                continue;
            }
            for entry in &connection.email_addresses {
                match EmailCheck::of(entry.as_deref()) {
                    EmailCheck::Valid(email) => {
                        index.add_email(group_id, email);
                        stats.emails_added += 1;
                    }
                    EmailCheck::Invalid => {
                        trace!("Skipping invalid email {:?}", entry);
                        stats.invalid_emails += 1;
                    }
                    EmailCheck::Absent => {
                        trace!("Skipping email entry without a value");
                        stats.absent_emails += 1;
                    }
                }
            }
        }
    }

    stats
}
