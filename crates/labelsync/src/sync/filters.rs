//! Filter reconciliation
//!
//! The mail system cannot update a filter in place, so convergence is
//! delete-all-managed then recreate-from-desired-state. All deletions finish
//! before the first creation, and creations run one at a time.

use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;

use crate::config::SyncConfig;
use crate::models::{Filter, FilterSpec, GroupIndex, LabelIndex};
use crate::remote::{MailSettings, NotFoundError};

/// Error indicating a managed group reached filter creation without a label
#[derive(Debug, thiserror::Error)]
#[error("No label for managed group {0}")]
pub struct MissingLabelError(pub String);

/// A filter the sync wants deployed, tagged with the group it serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredFilter {
    pub group: String,
    pub spec: FilterSpec,
}

/// Filters to deploy, in group index order, plus the groups skipped for having no emails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredState {
    pub filters: Vec<DesiredFilter>,
    pub empty_groups: Vec<String>,
}

/// Counters from a filter reconciliation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    /// Managed filters found deployed
    pub managed_found: usize,
    /// Managed filters deleted by this run
    pub deleted: usize,
    /// Managed filters that were already gone at deletion time
    pub already_deleted: usize,
    /// Filters created
    pub created: usize,
    /// Groups skipped because they have no emails
    pub skipped_empty: usize,
}

/// Compute the filters that should exist for the current groups
pub fn desired_filters(
    groups: &GroupIndex,
    labels: &LabelIndex,
    config: &SyncConfig,
) -> Result<DesiredState> {
    let mut state = DesiredState::default();

    for group in groups.iter() {
        let label = labels
            .id_for_name(&group.name)
            .ok_or_else(|| MissingLabelError(group.name.clone()))?;

        if group.is_empty() {
            state.empty_groups.push(group.name.clone());
            continue;
        }

        state.filters.push(DesiredFilter {
            group: group.name.clone(),
            spec: FilterSpec::label_senders(&group.emails, label.clone(), config.spam_label.clone()),
        });
    }

    Ok(state)
}

/// Filters whose actions add at least one managed label
pub fn managed_filters(filters: Vec<Filter>, labels: &LabelIndex) -> Vec<Filter> {
    filters
        .into_iter()
        .filter(|f| f.adds_any_label(|id| labels.contains_id(id)))
        .collect()
}

/// Delete the given filters concurrently.
///
/// A filter that is already gone counts as deleted.
///
/// # Returns
/// (deleted, already gone)
pub fn delete_filters(mail: &dyn MailSettings, filters: &[Filter]) -> Result<(usize, usize)> {
    let outcomes = filters
        .par_iter()
        .map(|filter| {
            info!("Deleting filter {}: {:?}", filter.id.as_str(), filter.criteria.from);
            match mail.delete_filter(&filter.id) {
                Ok(()) => Ok(true),
                Err(e) if e.downcast_ref::<NotFoundError>().is_some() => {
                    debug!("Filter {} already deleted", filter.id.as_str());
                    Ok(false)
                }
                Err(e) => Err(e.context(format!("Failed to delete filter {}", filter.id.as_str()))),
            }
        })
        .collect::<Result<Vec<bool>>>()?;

    let deleted = outcomes.iter().filter(|&&removed| removed).count();
    Ok((deleted, outcomes.len() - deleted))
}

/// Make the deployed managed filters match the groups exactly
pub fn reconcile_filters(
    mail: &dyn MailSettings,
    groups: &GroupIndex,
    labels: &LabelIndex,
    config: &SyncConfig,
) -> Result<FilterStats> {
    let mut stats = FilterStats::default();
    let desired = desired_filters(groups, labels, config)?;

    info!("Get all managed mail filters");
    let filters = mail.list_filters().context("Failed to list filters")?;
    let managed = managed_filters(filters, labels);
    stats.managed_found = managed.len();
    debug!("Managed filters: {:?}", managed);

    info!("Delete all managed filters");
    let (deleted, already_deleted) = delete_filters(mail, &managed)?;
    stats.deleted = deleted;
    stats.already_deleted = already_deleted;

    info!("Create new filters based on contact groups");
    for name in &desired.empty_groups {
        info!("Skipped {}: group empty", name);
    }
    stats.skipped_empty = desired.empty_groups.len();

    // Sequential on purpose: the mail system serializes filter changes
    for wanted in &desired.filters {
        info!("Creating filter for {}", wanted.group);
        let created = mail
            .create_filter(&wanted.spec)
            .with_context(|| format!("Failed to create filter for {}", wanted.group))?;
        debug!("Created filter {}: {:?}", created.id.as_str(), created.spec());
        stats.created += 1;
    }

    Ok(stats)
}
