/// Board store engine for kanban boards kept as a directory of markdown files:
/// one directory per list, one file per card, YAML frontmatter per card.
pub mod config;
pub mod frontmatter;
pub mod ordering;
pub mod scanner;
pub mod storage;
pub mod timestamp;
pub mod types;
pub mod watcher;

pub use config::{
    init_board_dir, load_board_config, merge_list_entries, save_board_config, BoardConfig,
    CardTemplate, ListEntry, ReconcileReport,
};
pub use frontmatter::{read_card_content, write_card_file};
pub use ordering::{compute_insert_position, insert_sorted, InsertPosition};
pub use scanner::scan_board;
pub use storage::{validate_list_name, validate_path, BoardStore, StorageError, StoreOptions};
pub use types::{BoardState, BoardStats, CardMetadata, KanbanCard};
pub use watcher::{BoardChangeEvent, PollWatcher};
