use super::balloon::BalloonTimer;
use super::icon::NotificationIcon;
use super::menu::PopupMenu;
use super::message::{Dispatch, MenuCommand, TrayMessage};
use super::platform::TrayHost;
use crate::dialogs::WindowSet;
use crate::shell::Shell;
use crate::status::StatusSource;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// The tray state machine. One instance drains one message queue; all
/// tray-slot state lives in the owned components, the dispatcher itself
/// is stateless.
pub struct TrayController {
    icon: NotificationIcon,
    menu: Arc<PopupMenu>,
    balloon: BalloonTimer,
    windows: WindowSet,
    host: Box<dyn TrayHost>,
    tx: UnboundedSender<TrayMessage>,
    shutdown: broadcast::Sender<()>,
}

impl TrayController {
    /// Builds the controller and installs the tray icon. An add failure
    /// is fatal: without the icon the program has no UI surface, so the
    /// error propagates out and the process exits.
    pub fn new(
        shell: Arc<dyn Shell>,
        status: Arc<dyn StatusSource>,
        menu: Arc<PopupMenu>,
        windows: WindowSet,
        host: Box<dyn TrayHost>,
        tx: UnboundedSender<TrayMessage>,
        shutdown: broadcast::Sender<()>,
    ) -> Result<Self> {
        let mut icon = NotificationIcon::new(shell, status, menu.clone());
        icon.add()?;

        Ok(Self {
            icon,
            menu,
            balloon: BalloonTimer::new(),
            windows,
            host,
            tx,
            shutdown,
        })
    }

    /// Dispatches one message. Messages arrive serialized through the
    /// queue, so icon transitions never interleave with themselves.
    pub fn handle(&mut self, message: TrayMessage) -> Dispatch {
        match message {
            TrayMessage::PollTick => {
                self.icon.update();
                Dispatch::Continue
            }

            TrayMessage::BalloonShown { timeout } => {
                // Cancel-before-arm keeps at most one clear timer alive.
                self.balloon.arm(timeout, self.tx.clone());
                Dispatch::Continue
            }

            TrayMessage::BalloonExpired { generation } => {
                if self.balloon.accepts(generation) {
                    self.balloon.cancel();
                    self.icon.clear_balloon();
                }
                Dispatch::Continue
            }

            TrayMessage::Menu(MenuCommand::Status) => {
                self.windows.status.show(true);
                self.icon.update();
                Dispatch::Continue
            }

            TrayMessage::Menu(MenuCommand::Events) => {
                self.windows.events.show(true);
                self.icon.update();
                Dispatch::Continue
            }

            TrayMessage::Menu(MenuCommand::About) => {
                self.windows.about.show(true);
                Dispatch::Continue
            }

            TrayMessage::Menu(MenuCommand::Close) => {
                self.host.request_close();
                Dispatch::Continue
            }

            TrayMessage::IconRightClick => {
                if !self.menu.is_empty() {
                    // Selection re-enters the queue as a Menu message.
                    if let Err(e) = self.host.show_menu() {
                        log::debug!("Popup menu display failed: {}", e);
                    }
                }
                Dispatch::Continue
            }

            TrayMessage::IconDoubleClick => {
                // Same command path as selecting item 0 from the popup.
                if let Some(entry) = self.menu.default_entry() {
                    let _ = self.tx.send(TrayMessage::Menu(entry.command));
                }
                Dispatch::Continue
            }

            TrayMessage::CloseRequested => {
                // Destruction follows through the host's default
                // handling; nothing to do here.
                log::debug!("Window close requested");
                Dispatch::Continue
            }

            TrayMessage::Destroyed => {
                self.icon.remove();
                let _ = self.shutdown.send(());
                Dispatch::Quit
            }

            TrayMessage::SessionEnding { logging_off } => {
                if logging_off {
                    Dispatch::Continue
                } else {
                    log::info!("Session ending, shutting down");
                    let _ = self.shutdown.send(());
                    Dispatch::Quit
                }
            }
        }
    }

    /// Drains the queue until a terminal message. The icon is removed on
    /// the way out even if the loop is aborted, via the icon's own drop.
    pub async fn run(mut self, mut rx: UnboundedReceiver<TrayMessage>) {
        while let Some(message) = rx.recv().await {
            if self.handle(message) == Dispatch::Quit {
                break;
            }
        }
    }
}
