/// Polling board watcher.
///
/// A background thread snapshots the board every `interval` and fires the
/// change callback once per detected change-set. Events are also published
/// on a broadcast channel for any number of subscribers.
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::broadcast;

use super::snapshot::{changed_paths, has_changed, take_snapshot, Snapshot};
use super::suppress::SuppressionWindow;
use super::types::BoardChangeEvent;
use crate::storage::Result;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const EVENT_CHANNEL_CAPACITY: usize = 64;

type ChangeCallback = Box<dyn FnMut() + Send>;

struct WatchState {
    baseline: Snapshot,
    suppression: SuppressionWindow,
}

struct Shared {
    root: PathBuf,
    state: Mutex<WatchState>,
    on_change: Mutex<ChangeCallback>,
    event_tx: broadcast::Sender<BoardChangeEvent>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One poll cycle. Returns whether a change was reported.
    fn poll(&self) -> bool {
        let current = take_snapshot(&self.root);

        let changed = {
            let mut state = self.state();
            let suppressed = state.suppression.is_active();
            let prev = std::mem::replace(&mut state.baseline, current);
            if suppressed {
                if has_changed(&prev, &state.baseline) {
                    log::debug!(
                        "[daedalus.watcher] Ignoring changes in {:?} during suppression window",
                        self.root
                    );
                }
                return false;
            }
            if !has_changed(&prev, &state.baseline) {
                return false;
            }
            changed_paths(&prev, &state.baseline)
        };

        log::info!(
            "[daedalus.watcher] External change in {:?} ({} paths)",
            self.root,
            changed.len()
        );

        // state lock is released here, so the callback may call suppress()
        let mut on_change = self.on_change.lock().unwrap_or_else(PoisonError::into_inner);
        if panic::catch_unwind(AssertUnwindSafe(|| (*on_change)())).is_err() {
            log::error!("[daedalus.watcher] Change callback for {:?} panicked", self.root);
        }
        drop(on_change);

        let event = BoardChangeEvent::ExternalChange {
            root: self.root.clone(),
            changed_paths: changed,
        };
        if self.event_tx.send(event).is_err() {
            log::debug!("[daedalus.watcher] No event subscribers");
        }
        true
    }
}

/// Handle to a running poll loop. Dropping it stops the loop.
pub struct PollWatcher {
    shared: Arc<Shared>,
    interval: Duration,
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PollWatcher {
    /// Start watching `root` with the default 5 second interval.
    pub fn new<F>(root: &Path, on_change: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::with_interval(root, DEFAULT_POLL_INTERVAL, on_change)
    }

    pub fn with_interval<F>(root: &Path, interval: Duration, on_change: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let baseline = take_snapshot(root);
        let tracked = baseline.len();
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let shared = Arc::new(Shared {
            root: root.to_path_buf(),
            state: Mutex::new(WatchState {
                baseline,
                suppression: SuppressionWindow::new(),
            }),
            on_change: Mutex::new(Box::new(on_change)),
            event_tx,
        });

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let loop_shared = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("daedalus-watcher".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            loop_shared.poll();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("[daedalus.watcher] Poll thread for {:?} exiting", loop_shared.root);
            })?;

        log::info!(
            "[daedalus.watcher] Watching {:?} every {:?} ({} paths)",
            root,
            interval,
            tracked
        );

        Ok(Self {
            shared,
            interval,
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ignore changes seen by polls during the next `duration`.
    /// Call right before writing to the board.
    pub fn suppress(&self, duration: Duration) {
        self.shared.state().suppression.suppress(duration);
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Receive a [`BoardChangeEvent`] for every reported change.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardChangeEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Run one poll cycle immediately on the calling thread.
    pub fn poll_now(&self) -> bool {
        self.shared.poll()
    }

    /// Stop the poll loop and wait for it to exit. A poll already in
    /// progress finishes first. Idempotent.
    pub fn close(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if thread.join().is_err() {
            log::error!("[daedalus.watcher] Poll thread for {:?} panicked", self.shared.root);
        }
        let _ = self.shared.event_tx.send(BoardChangeEvent::Stopped {
            root: self.shared.root.clone(),
        });
        log::info!("[daedalus.watcher] Stopped watching {:?}", self.shared.root);
    }
}

impl Drop for PollWatcher {
    fn drop(&mut self) {
        self.close();
    }
}
