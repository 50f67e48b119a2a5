/// Reconciles the declared list order in `board.yaml` with the list
/// directories that actually exist on disk.
use std::collections::BTreeSet;

use super::{BoardConfig, ListEntry};

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Directories found on disk without an entry, appended to the config.
    pub added: Vec<String>,
    /// Entries dropped because their directory is gone.
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Merge `config.lists` with the set of list directories found on disk.
///
/// - entries whose directory still exists are kept, in their relative order,
///   with every flag intact;
/// - directories without an entry are appended as bare entries,
///   alphabetically;
/// - entries whose directory is gone are dropped.
pub fn merge_list_entries<I, S>(config: &mut BoardConfig, disk_dirs: I) -> ReconcileReport
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unclaimed: BTreeSet<String> = disk_dirs.into_iter().map(Into::into).collect();
    let mut report = ReconcileReport::default();

    let mut merged = Vec::with_capacity(config.lists.len() + unclaimed.len());
    for entry in config.lists.drain(..) {
        if unclaimed.remove(&entry.dir) {
            merged.push(entry);
        } else {
            report.removed.push(entry.dir);
        }
    }

    for dir in unclaimed {
        merged.push(ListEntry::new(dir.clone()));
        report.added.push(dir);
    }

    if !report.added.is_empty() {
        log::debug!(
            "[daedalus.reconcile] Discovered new list directories: {:?}",
            report.added
        );
    }
    if !report.removed.is_empty() {
        log::debug!(
            "[daedalus.reconcile] Dropped stale list entries: {:?}",
            report.removed
        );
    }

    config.lists = merged;
    report
}
