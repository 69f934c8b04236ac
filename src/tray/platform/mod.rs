#[cfg(target_os = "windows")]
mod windows;

#[cfg(not(target_os = "windows"))]
mod headless;

use super::menu::PopupMenu;
use super::message::TrayMessage;
use crate::shell::Shell;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Handle to the host window owning the tray slot.
pub trait TrayHost: Send + Sync {
    /// Displays the popup menu at the cursor. The user's selection
    /// re-enters the dispatcher as a `Menu` message; dismissal sends
    /// nothing.
    fn show_menu(&self) -> Result<()>;

    /// Asks the host window to close gracefully. Destruction and the
    /// terminal `Destroyed` message follow through default handling.
    fn request_close(&self);
}

pub struct HostHandles {
    pub host: Box<dyn TrayHost>,
    pub shell: Arc<dyn Shell>,
}

/// Creates the platform host: the hidden message window and pump on
/// Windows, a headless stand-in elsewhere. Fails when the window cannot
/// be created, which callers treat as fatal.
pub fn create_host(
    tx: UnboundedSender<TrayMessage>,
    menu: Arc<PopupMenu>,
    balloon_fallback: Duration,
) -> Result<HostHandles> {
    #[cfg(target_os = "windows")]
    {
        windows::create_host(tx, menu, balloon_fallback)
    }

    #[cfg(not(target_os = "windows"))]
    {
        headless::create_host(tx, menu, balloon_fallback)
    }
}
