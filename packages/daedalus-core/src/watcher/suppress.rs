/// Suppression of self-inflicted changes.
///
/// A poll cannot tell our own writes from an editor's, so the store opens a
/// window before writing. Polls that land inside the window accept the new
/// snapshot as the baseline without notifying anyone.
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy)]
pub struct SuppressionWindow {
    until: Option<Instant>,
}

impl SuppressionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress for `duration` starting at `now`. An already open window is
    /// only ever extended, never shortened.
    pub fn suppress_at(&mut self, now: Instant, duration: Duration) {
        let until = now + duration;
        self.until = Some(self.until.map_or(until, |current| current.max(until)));
    }

    pub fn suppress(&mut self, duration: Duration) {
        self.suppress_at(Instant::now(), duration);
    }

    /// Whether `now` falls inside the window. An expired window is cleared.
    pub fn is_active_at(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now < until => true,
            Some(_) => {
                self.until = None;
                false
            }
            None => false,
        }
    }

    pub fn is_active(&mut self) -> bool {
        self.is_active_at(Instant::now())
    }
}
