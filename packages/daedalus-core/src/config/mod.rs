/// Board configuration persisted as `board.yaml` at the board root.
///
/// The order of `lists` is the display order of the board; there is no
/// separate numeric order field for lists.
pub mod reconcile;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::storage::{atomic_write, Result};
use crate::types::{Checklist, Counter};

pub use reconcile::{merge_list_entries, ReconcileReport};

pub const BOARD_CONFIG_FILE: &str = "board.yaml";

/// Per-list settings. Identity is `dir`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub dir: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Card limit, 0 = unlimited.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub half_collapsed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
    /// "left", "right" or empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pinned: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
}

impl ListEntry {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// Preset used when creating cards from the board's template menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    /// Default title of cards created from the template.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<Counter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Checklist>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub label_colors: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<CardTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels_expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_year_progress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimal_view: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl BoardConfig {
    pub fn list_entry(&self, dir: &str) -> Option<&ListEntry> {
        find_list_entry(&self.lists, dir).map(|idx| &self.lists[idx])
    }

    /// Entry for `dir`, appending a bare one if the list is not declared yet.
    pub fn list_entry_mut(&mut self, dir: &str) -> &mut ListEntry {
        let idx = match find_list_entry(&self.lists, dir) {
            Some(idx) => idx,
            None => {
                self.lists.push(ListEntry::new(dir));
                self.lists.len() - 1
            }
        };
        &mut self.lists[idx]
    }

    /// Reorder the list declarations to follow `order`.
    /// Unknown names in `order` are ignored; declared lists missing from
    /// `order` keep their relative order after the named ones.
    pub fn reorder_lists(&mut self, order: &[String]) {
        let mut remaining = std::mem::take(&mut self.lists);
        let mut reordered = Vec::with_capacity(remaining.len());
        for dir in order {
            if let Some(pos) = remaining.iter().position(|e| &e.dir == dir) {
                reordered.push(remaining.remove(pos));
            }
        }
        reordered.extend(remaining);
        self.lists = reordered;
    }

    /// Set a boolean flag on every declared list: true for members of `dirs`,
    /// false for the rest.
    pub fn set_list_flags(&mut self, dirs: &[String], set: impl Fn(&mut ListEntry, bool)) {
        let wanted: HashSet<&str> = dirs.iter().map(String::as_str).collect();
        for entry in &mut self.lists {
            let on = wanted.contains(entry.dir.as_str());
            set(entry, on);
        }
    }

    /// Pin lists to the left or right side; every other list is unpinned.
    pub fn set_pinned(&mut self, left: &[String], right: &[String]) {
        for entry in &mut self.lists {
            entry.pinned = if left.contains(&entry.dir) {
                "left".to_string()
            } else if right.contains(&entry.dir) {
                "right".to_string()
            } else {
                String::new()
            };
        }
    }
}

/// Index of the entry with the given dir.
pub fn find_list_entry(lists: &[ListEntry], dir: &str) -> Option<usize> {
    lists.iter().position(|e| e.dir == dir)
}

pub fn is_list_locked(config: &BoardConfig, dir: &str) -> bool {
    config.list_entry(dir).map_or(false, |e| e.locked)
}

/// Read `board.yaml` from the board root. A missing file is an empty config.
pub fn load_board_config(root: &Path) -> Result<BoardConfig> {
    let path = root.join(BOARD_CONFIG_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("[daedalus.config] {:?} not found, using empty config", path);
            return Ok(BoardConfig::default());
        }
        Err(e) => {
            log::error!("[daedalus.config] Failed to read {:?}: {}", path, e);
            return Err(e.into());
        }
    };

    if content.trim().is_empty() {
        return Ok(BoardConfig::default());
    }

    let config: BoardConfig = serde_yaml_ng::from_str(&content).map_err(|e| {
        log::error!("[daedalus.config] Failed to parse {:?}: {}", path, e);
        e
    })?;
    log::debug!(
        "[daedalus.config] Loaded {:?} ({} lists)",
        path,
        config.lists.len()
    );
    Ok(config)
}

/// Write the config to `board.yaml` in the board root.
pub fn save_board_config(root: &Path, config: &BoardConfig) -> Result<()> {
    let yaml = serde_yaml_ng::to_string(config)?;
    let path = root.join(BOARD_CONFIG_FILE);
    atomic_write(&path, &yaml).map_err(|e| {
        log::error!("[daedalus.config] Failed to write {:?}: {}", path, e);
        e
    })?;
    log::debug!("[daedalus.config] Saved {:?}", path);
    Ok(())
}

/// Make sure `path` is a board: create the directory and an empty
/// `board.yaml` if they do not exist yet.
pub fn init_board_dir(path: &Path) -> Result<()> {
    if path.join(BOARD_CONFIG_FILE).exists() {
        return Ok(());
    }
    fs::create_dir_all(path)?;
    save_board_config(path, &BoardConfig::default())?;
    log::info!("[daedalus.config] Initialized new board at {:?}", path);
    Ok(())
}
