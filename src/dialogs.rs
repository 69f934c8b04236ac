//! Seams for the three secondary windows (Status, Events, About).
//!
//! The dialogs themselves are owned by the surrounding program; the tray
//! only ever invokes a uniform show operation on them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A window the tray can surface. `show` is idempotent and may be called
/// while the window is already visible.
pub trait SecondaryWindow: Send + Sync {
    fn show(&self, bring_to_front: bool);
}

/// The three windows reachable from the tray menu.
pub struct WindowSet {
    pub status: Arc<dyn SecondaryWindow>,
    pub events: Arc<dyn SecondaryWindow>,
    pub about: Arc<dyn SecondaryWindow>,
}

impl WindowSet {
    /// Placeholder set used until the host program wires real dialogs.
    pub fn logging() -> Self {
        Self {
            status: Arc::new(LoggingWindow::new("status")),
            events: Arc::new(LoggingWindow::new("events")),
            about: Arc::new(LoggingWindow::new("about")),
        }
    }
}

/// Stand-in window that records show requests in the log.
pub struct LoggingWindow {
    name: &'static str,
    shown: AtomicUsize,
}

impl LoggingWindow {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            shown: AtomicUsize::new(0),
        }
    }

    pub fn show_count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

impl SecondaryWindow for LoggingWindow {
    fn show(&self, bring_to_front: bool) {
        self.shown.fetch_add(1, Ordering::SeqCst);
        log::info!("Show {} window (bring_to_front={})", self.name, bring_to_front);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_is_counted_and_repeatable() {
        let window = LoggingWindow::new("status");
        window.show(true);
        window.show(true);
        window.show(false);
        assert_eq!(window.show_count(), 3);
    }

    #[test]
    fn logging_set_wires_all_three_windows() {
        let set = WindowSet::logging();
        set.status.show(true);
        set.events.show(true);
        set.about.show(true);
    }
}
