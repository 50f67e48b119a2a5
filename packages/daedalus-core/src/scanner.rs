/// Full board scan: directory tree -> [`BoardState`].
///
/// Every list directory is scanned on its own thread. Results are collected
/// in a mutex-guarded accumulator and only assembled into a `BoardState`
/// after all list threads have joined.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use crate::config::{load_board_config, merge_list_entries};
use crate::frontmatter::parse_file_header;
use crate::ordering::sort_cards;
use crate::storage::{file_size, normalize_path, Result};
use crate::types::{is_card_file_name, is_list_dir_name, BoardState, KanbanCard, CARD_EXT};

/// Result of scanning one list directory.
#[derive(Debug, Default)]
pub struct ListScan {
    pub cards: Vec<KanbanCard>,
    pub max_id: u64,
    pub bytes: i64,
}

#[derive(Default)]
struct ScanAccumulator {
    lists: HashMap<String, Vec<KanbanCard>>,
    max_id: u64,
    bytes: i64,
}

/// Names of the list directories directly under `root`, sorted.
pub fn list_dirs(root: &Path) -> std::io::Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_list_dir_name(&name) {
            dirs.push(name);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Numeric id encoded in a card file name (`12.md` -> 12), 0 otherwise.
pub fn id_from_file_name(path: &Path) -> u64 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Scan a board directory into memory.
///
/// The board's `board.yaml` is loaded and reconciled against the list
/// directories found, so the returned config declares exactly the lists on
/// disk. Unparseable cards are skipped with a warning.
pub fn scan_board(root: &Path) -> Result<BoardState> {
    let root = normalize_path(root)?;
    let dirs = list_dirs(&root).map_err(|e| {
        log::error!("[daedalus.scan] Failed to read board root {:?}: {}", root, e);
        e
    })?;

    let config_start = Instant::now();
    let config = load_board_config(&root)?;
    let config_load_time = config_start.elapsed();

    let scan_start = Instant::now();
    let acc = Mutex::new(ScanAccumulator::default());
    std::thread::scope(|scope| {
        for dir in &dirs {
            let list_path = root.join(dir);
            let acc = &acc;
            scope.spawn(move || {
                let scan = scan_list(&list_path, dir);
                let mut acc = acc.lock().unwrap();
                acc.max_id = acc.max_id.max(scan.max_id);
                acc.bytes += scan.bytes;
                acc.lists.insert(dir.clone(), scan.cards);
            });
        }
    });
    let acc = acc.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut state = BoardState::new(root, config);
    state.lists = acc.lists;
    state.max_id = acc.max_id;
    state.total_file_bytes = acc.bytes;
    state.config_load_time = config_load_time;
    state.scan_time = scan_start.elapsed();

    merge_list_entries(&mut state.config, dirs);

    log::info!(
        "[daedalus.scan] Scanned {:?}: {} lists, {} cards, max id {} in {:?}",
        state.root_path,
        state.lists.len(),
        state.card_count(),
        state.max_id,
        state.scan_time
    );
    Ok(state)
}

/// Parse every card file of one list directory, sorted for display.
/// An unreadable directory yields an empty list.
pub fn scan_list(list_path: &Path, list_name: &str) -> ListScan {
    let entries = match fs::read_dir(list_path) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!(
                "[daedalus.scan] Failed to read list directory {:?}: {}",
                list_path,
                e
            );
            return ListScan::default();
        }
    };

    let mut scan = ListScan::default();
    for entry in entries.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_file || !is_card_file_name(&name) {
            continue;
        }

        let path: PathBuf = entry.path();
        let (mut metadata, preview) = match parse_file_header(&path) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!(
                    "[daedalus.scan] Skipping invalid card {}/{}: {}",
                    list_name,
                    name,
                    e
                );
                continue;
            }
        };

        if metadata.id == 0 {
            metadata.id = id_from_file_name(&path);
            log::debug!(
                "[daedalus.scan] Card {}/{} has no id, using file name ({})",
                list_name,
                name,
                metadata.id
            );
        }
        scan.max_id = scan.max_id.max(metadata.id);
        scan.bytes += file_size(&path);

        scan.cards.push(KanbanCard {
            file_path: path,
            list_name: list_name.to_string(),
            metadata,
            preview_text: preview,
        });
    }
    sort_cards(&mut scan.cards);

    log::debug!(
        "[daedalus.scan] List {} scanned: {} cards, max id {}, {} bytes",
        list_name,
        scan.cards.len(),
        scan.max_id,
        scan.bytes
    );
    scan
}

/// File name for a card id: `12` -> `12.md`.
pub fn card_file_name(id: u64) -> String {
    format!("{id}.{CARD_EXT}")
}
