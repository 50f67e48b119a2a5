/// Modification-time snapshots of a board directory.
///
/// A snapshot covers the board root, `board.yaml`, every list directory and
/// every card file inside those directories. Two snapshots differ when the
/// set of paths differs or any modification time changed.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::BOARD_CONFIG_FILE;
use crate::types::{is_card_file_name, is_list_dir_name};

pub type Snapshot = HashMap<PathBuf, SystemTime>;

fn record(snapshot: &mut Snapshot, path: PathBuf) {
    if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
        snapshot.insert(path, modified);
    }
}

/// Stat everything the board consists of. Unreadable directories are
/// logged and contribute nothing.
pub fn take_snapshot(root: &Path) -> Snapshot {
    let mut snapshot = Snapshot::new();
    record(&mut snapshot, root.to_path_buf());
    record(&mut snapshot, root.join(BOARD_CONFIG_FILE));

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("[daedalus.watcher] Failed to read board root {:?}: {}", root, e);
            return snapshot;
        }
    };

    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_dir || !is_list_dir_name(&name) {
            continue;
        }

        let list_dir = entry.path();
        record(&mut snapshot, list_dir.clone());

        let files = match fs::read_dir(&list_dir) {
            Ok(files) => files,
            Err(e) => {
                log::warn!("[daedalus.watcher] Failed to read list dir {:?}: {}", list_dir, e);
                continue;
            }
        };
        for file in files.flatten() {
            let is_file = file.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file || !is_card_file_name(&file.file_name().to_string_lossy()) {
                continue;
            }
            if let Ok(modified) = file.metadata().and_then(|m| m.modified()) {
                snapshot.insert(file.path(), modified);
            }
        }
    }
    snapshot
}

pub fn has_changed(prev: &Snapshot, current: &Snapshot) -> bool {
    prev.len() != current.len()
        || current
            .iter()
            .any(|(path, modified)| prev.get(path) != Some(modified))
}

/// Paths added, removed or modified between two snapshots, sorted.
pub fn changed_paths(prev: &Snapshot, current: &Snapshot) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = current
        .iter()
        .filter(|(path, modified)| prev.get(*path) != Some(*modified))
        .map(|(path, _)| path.clone())
        .chain(prev.keys().filter(|p| !current.contains_key(*p)).cloned())
        .collect();
    paths.sort();
    paths
}
