//! Label reconciliation: one mail label per managed group

use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;

use crate::config::SyncConfig;
use crate::models::{GroupIndex, LabelIndex};
use crate::remote::MailSettings;

/// Make sure every managed group has a mail label of the same name.
///
/// Existing labels are reused and never deleted or renamed. Missing labels
/// are created concurrently.
///
/// # Returns
/// The managed-label index including the new labels, and how many were created
pub fn reconcile_labels(
    mail: &dyn MailSettings,
    groups: &GroupIndex,
    config: &SyncConfig,
) -> Result<(LabelIndex, usize)> {
    info!("Get all managed mail labels");
    let labels = mail.list_labels().context("Failed to list labels")?;
    let mut index = LabelIndex::from_labels(&labels, &config.prefix);
    debug!("Managed labels: {:?}", index.sorted());

    info!("Create labels that do not exist");
    let missing: Vec<&str> = groups
        .names()
        .filter(|name| !index.contains_name(name))
        .collect();

    let created = missing
        .par_iter()
        .map(|name| {
            info!("Creating label: {}", name);
            mail.create_label(name)
                .with_context(|| format!("Failed to create label {}", name))
        })
        .collect::<Result<Vec<_>>>()?;

    let count = created.len();
    for label in created {
        index.insert(label.id, label.name);
    }

    debug!("Managed labels after creation: {:?}", index.sorted());
    Ok((index, count))
}
