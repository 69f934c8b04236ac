pub mod balloon;
pub mod controller;
pub mod icon;
pub mod menu;
pub mod message;
pub mod platform;

use crate::config::TrayConfig;
use crate::dialogs::WindowSet;
use crate::status::StatusSource;
use anyhow::Result;
use controller::TrayController;
use menu::PopupMenu;
use message::TrayMessage;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Owner of the running tray: the platform host, the dispatcher task
/// and the poll timer. Dropping the agent tears all of it down; the
/// icon itself is removed by the controller on the way out.
pub struct TrayAgent {
    controller: JoinHandle<()>,
    poll: JoinHandle<()>,
}

impl TrayAgent {
    /// Brings the tray up: hidden host window, initial icon add, poll
    /// timer. Any failure here is fatal to the caller since the tray is
    /// the program's only UI surface.
    pub fn start(
        config: &TrayConfig,
        status: Arc<dyn StatusSource>,
        windows: WindowSet,
        shutdown: broadcast::Sender<()>,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let menu = Arc::new(PopupMenu::standard());

        let handles = platform::create_host(tx.clone(), menu.clone(), config.balloon_timeout())?;
        let controller = TrayController::new(
            handles.shell,
            status,
            menu,
            windows,
            handles.host,
            tx.clone(),
            shutdown,
        )?;

        let poll_interval = config.poll_interval();
        let poll = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            // The first tick fires immediately; the icon was just added
            // with fresh status, so skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(TrayMessage::PollTick).is_err() {
                    break;
                }
            }
        });

        let controller = tokio::spawn(controller.run(rx));

        log::info!("Tray agent started");
        Ok(Self { controller, poll })
    }
}

impl Drop for TrayAgent {
    fn drop(&mut self) {
        self.poll.abort();
        self.controller.abort();
    }
}
