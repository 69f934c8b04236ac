use super::menu::PopupMenu;
use crate::shell::{self, BalloonContent, Glyph, Shell, ShellOp, ShellRequest};
use crate::status::StatusSource;
use anyhow::Result;
use std::sync::Arc;

/// Stable id of the single tray slot, fixed for the process lifetime.
pub const TRAY_ICON_ID: u32 = 1;

/// Callback message id (WM_USER + 1) the shell delivers pointer events
/// through.
pub const CALLBACK_MESSAGE: u32 = 0x0401;

/// Tooltip prefix; the status line is appended after a dash.
pub const PRODUCT_NAME: &str = "Apcupsd";

/// Owner of the tray slot lifecycle. Add, update and remove all funnel
/// through one send path that recomputes the power state, picks the
/// glyph and formats the tooltip, so the icon can never drift from the
/// status source.
pub struct NotificationIcon {
    shell: Arc<dyn Shell>,
    status: Arc<dyn StatusSource>,
    menu: Arc<PopupMenu>,
    removed: bool,
}

impl NotificationIcon {
    pub fn new(shell: Arc<dyn Shell>, status: Arc<dyn StatusSource>, menu: Arc<PopupMenu>) -> Self {
        Self {
            shell,
            status,
            menu,
            removed: false,
        }
    }

    /// Installs the icon. Failure here is fatal to the caller: without
    /// the tray slot the program has no UI surface at all.
    pub fn add(&mut self) -> Result<()> {
        self.send(ShellOp::Add)
    }

    /// Refreshes glyph and tooltip from the status source. Best-effort.
    pub fn update(&mut self) {
        if let Err(e) = self.send(ShellOp::Modify) {
            log::debug!("Tray icon update failed: {}", e);
        }
    }

    /// Removes the icon. Best-effort, and issued at most once.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        if let Err(e) = self.send(ShellOp::Delete) {
            log::debug!("Tray icon removal failed: {}", e);
        }
    }

    /// Raises a balloon notification on the tray slot. Best-effort; the
    /// auto-clear timer is armed when the shell reports the balloon on
    /// screen, not here.
    pub fn show_balloon(&self, content: BalloonContent) {
        let mut request = ShellRequest::bare(TRAY_ICON_ID);
        request.flags = shell::flags::INFO;
        request.balloon = Some(content);

        if let Err(e) = self.shell.notify(ShellOp::Modify, &request) {
            log::debug!("Balloon notification failed: {}", e);
        }
    }

    /// Clears any balloon currently on screen: a modify with only the
    /// info flag set and empty title, body and timeout.
    pub fn clear_balloon(&self) {
        let mut request = ShellRequest::bare(TRAY_ICON_ID);
        request.flags = shell::flags::INFO;
        request.balloon = Some(BalloonContent::clear());

        if let Err(e) = self.shell.notify(ShellOp::Modify, &request) {
            log::debug!("Balloon clear failed: {}", e);
        }
    }

    fn send(&self, op: ShellOp) -> Result<()> {
        let snapshot = self.status.snapshot();

        let mut request = ShellRequest::bare(TRAY_ICON_ID);
        request.flags = shell::flags::ICON | shell::flags::MESSAGE | shell::flags::TIP;
        request.glyph = Some(Glyph::for_state(snapshot.state()));
        request.callback = Some(CALLBACK_MESSAGE);
        request.tooltip = Some(shell::truncate_tooltip(&format!(
            "{} - {}",
            PRODUCT_NAME, snapshot.status_text
        )));

        self.shell.notify(op, &request)?;

        // The icon is confirmed present, so the Close exit path is safe
        // to offer.
        self.menu.set_close_enabled(true);
        Ok(())
    }
}

impl Drop for NotificationIcon {
    fn drop(&mut self) {
        self.remove();
    }
}
