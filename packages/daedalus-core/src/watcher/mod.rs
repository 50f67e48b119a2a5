pub mod poll_watcher;
pub mod snapshot;
pub mod suppress;
pub mod types;

pub use poll_watcher::{PollWatcher, DEFAULT_POLL_INTERVAL};
pub use snapshot::{has_changed, take_snapshot, Snapshot};
pub use suppress::SuppressionWindow;
pub use types::BoardChangeEvent;
