use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::BoardConfig;
use crate::timestamp::{self, Timestamp};

/// Maximum character length for card body previews.
pub const PREVIEW_MAX_LEN: usize = 150;

/// File suffix of card files inside a list directory.
pub const CARD_EXT: &str = "md";

/// Directory names reserved for board assets (never treated as lists).
pub const RESERVED_DIRS: &[&str] = &["assets", "_assets"];

/// Whether a directory entry under the board root is a list directory.
/// Hidden (`.`-prefixed) and reserved asset directories are not.
pub fn is_list_dir_name(name: &str) -> bool {
    !name.starts_with('.') && !RESERVED_DIRS.contains(&name)
}

/// Whether a file name looks like a card file.
pub fn is_card_file_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map_or(false, |ext| ext == CARD_EXT)
        && !name.starts_with('.')
}

/// YAML frontmatter of a card file.
///
/// Only the fields listed here are interpreted. Anything else found in a
/// card's frontmatter is carried through writes untouched (see
/// [`crate::frontmatter::merge_frontmatter`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardMetadata {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(default)]
    pub list_order: f64,
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub due: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<Counter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Checklist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeseries: Option<TimeSeries>,
}

/// Frontmatter keys owned by [`CardMetadata`]. Every other key is foreign.
pub const KNOWN_META_KEYS: &[&str] = &[
    "id",
    "title",
    "created",
    "updated",
    "list_order",
    "due",
    "range",
    "labels",
    "icon",
    "url",
    "estimate",
    "counter",
    "checklist",
    "timeseries",
];

/// Date range a card is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "timestamp")]
    pub start: Timestamp,
    #[serde(with = "timestamp")]
    pub end: Timestamp,
}

/// Incrementable counter with a label.
/// If `start < max` the counter counts up; if `start > max` it counts down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    #[serde(default)]
    pub current: i64,
    #[serde(default)]
    pub max: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub step: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default)]
    pub items: Vec<CheckListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckListItem {
    #[serde(default)]
    pub idx: u32,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub done: bool,
}

/// Labelled series of numeric samples (e.g. a weight log).
/// Persisted even when empty, so an untitled series survives a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub entries: Vec<TimeSeriesEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesEntry {
    #[serde(rename = "t")]
    pub time: String,
    #[serde(rename = "v")]
    pub value: f64,
}

/// One card as held in memory. `file_path` is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanCard {
    pub file_path: PathBuf,
    pub list_name: String,
    pub metadata: CardMetadata,
    pub preview_text: String,
}

impl KanbanCard {
    pub fn id(&self) -> u64 {
        self.metadata.id
    }

    pub fn list_order(&self) -> f64 {
        self.metadata.list_order
    }
}

/// In-memory state of one board, built by [`crate::scanner::scan_board`].
#[derive(Debug, Clone)]
pub struct BoardState {
    pub root_path: PathBuf,
    /// list directory name -> cards in display order
    pub lists: HashMap<String, Vec<KanbanCard>>,
    pub config: BoardConfig,
    /// High-water mark of assigned card ids. Never decremented.
    pub max_id: u64,
    /// Sum of card file sizes, maintained incrementally by mutations.
    pub total_file_bytes: i64,
    pub config_load_time: Duration,
    pub scan_time: Duration,
}

impl BoardState {
    pub fn new(root_path: PathBuf, config: BoardConfig) -> Self {
        Self {
            root_path,
            lists: HashMap::new(),
            config,
            max_id: 0,
            total_file_bytes: 0,
            config_load_time: Duration::ZERO,
            scan_time: Duration::ZERO,
        }
    }

    /// Locate a card by its absolute file path.
    /// Returns the list key and the index within that list.
    pub fn find_card(&self, path: &Path) -> Option<(String, usize)> {
        self.lists.iter().find_map(|(list, cards)| {
            cards
                .iter()
                .position(|c| c.file_path == path)
                .map(|idx| (list.clone(), idx))
        })
    }

    pub fn card_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Lists in display order, as declared by the (reconciled) config.
    pub fn ordered_lists(&self) -> Vec<(&str, &[KanbanCard])> {
        self.config
            .lists
            .iter()
            .filter_map(|entry| {
                self.lists
                    .get(&entry.dir)
                    .map(|cards| (entry.dir.as_str(), cards.as_slice()))
            })
            .collect()
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            num_cards: self.card_count(),
            num_lists: self.lists.len(),
            max_id: self.max_id,
            file_size_mb: self.total_file_bytes as f64 / (1024.0 * 1024.0),
        }
    }
}

/// Summary numbers for the metrics overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    pub num_cards: usize,
    pub num_lists: usize,
    #[serde(rename = "maxID")]
    pub max_id: u64,
    pub file_size_mb: f64,
}

/// Truncate a card body to the preview length on a char boundary.
pub fn truncate_preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_MAX_LEN) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_dir_filter() {
        assert!(is_list_dir_name("open"));
        assert!(is_list_dir_name("00___open"));
        assert!(!is_list_dir_name(".git"));
        assert!(!is_list_dir_name("assets"));
        assert!(!is_list_dir_name("_assets"));
    }

    #[test]
    fn test_card_file_filter() {
        assert!(is_card_file_name("12.md"));
        assert!(is_card_file_name("notes.md"));
        assert!(!is_card_file_name("12.txt"));
        assert!(!is_card_file_name(".12.md"));
        assert!(!is_card_file_name("12.daedalus.tmp"));
    }

    #[test]
    fn test_truncate_preview_multibyte() {
        let body = "é".repeat(PREVIEW_MAX_LEN + 10);
        let preview = truncate_preview(&body);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_LEN);

        assert_eq!(truncate_preview("short"), "short");
    }

    #[test]
    fn test_card_json_shape() {
        let card = KanbanCard {
            file_path: PathBuf::from("/b/open/1.md"),
            list_name: "open".to_string(),
            metadata: CardMetadata {
                id: 1,
                title: "One".to_string(),
                list_order: 2.5,
                timeseries: Some(TimeSeries {
                    label: "Steps".to_string(),
                    entries: vec![TimeSeriesEntry {
                        time: "2026-02-01".to_string(),
                        value: 8000.0,
                    }],
                }),
                ..Default::default()
            },
            preview_text: "hello".to_string(),
        };

        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"filePath\""));
        assert!(json.contains("\"previewText\""));
        assert!(json.contains("\"list_order\":2.5"));
        assert!(json.contains("\"timeseries\""));
        assert!(!json.contains("\"due\""));

        let decoded: KanbanCard = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, card);
    }

    #[test]
    fn test_stats() {
        let mut state = BoardState::new(PathBuf::from("/b"), BoardConfig::default());
        state.lists.insert("open".to_string(), Vec::new());
        state.max_id = 7;
        state.total_file_bytes = 2 * 1024 * 1024;

        let stats = state.stats();
        assert_eq!(stats.num_lists, 1);
        assert_eq!(stats.num_cards, 0);
        assert_eq!(stats.max_id, 7);
        assert!((stats.file_size_mb - 2.0).abs() < f64::EPSILON);
    }
}
