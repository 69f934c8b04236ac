//! Host stand-in for platforms without a notification area. Keeps the
//! agent runnable (and the whole state machine testable) off Windows:
//! shell requests are accepted and logged, and a close request walks the
//! same close-then-destroy sequence the real window would.

use super::{HostHandles, TrayHost};
use crate::shell::{Shell, ShellOp, ShellRequest};
use crate::tray::menu::PopupMenu;
use crate::tray::message::TrayMessage;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

struct HeadlessHost {
    tx: UnboundedSender<TrayMessage>,
}

impl TrayHost for HeadlessHost {
    fn show_menu(&self) -> Result<()> {
        log::debug!("No notification area on this platform; popup menu skipped");
        Ok(())
    }

    fn request_close(&self) {
        let _ = self.tx.send(TrayMessage::CloseRequested);
        let _ = self.tx.send(TrayMessage::Destroyed);
    }
}

struct NullShell;

impl Shell for NullShell {
    fn notify(&self, op: ShellOp, request: &ShellRequest) -> Result<()> {
        log::trace!("Shell request (no-op): {:?} {:?}", op, request);
        Ok(())
    }
}

pub fn create_host(
    tx: UnboundedSender<TrayMessage>,
    _menu: Arc<PopupMenu>,
    _balloon_fallback: Duration,
) -> Result<HostHandles> {
    Ok(HostHandles {
        host: Box::new(HeadlessHost { tx }),
        shell: Arc::new(NullShell),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn close_request_walks_close_then_destroy() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handles = create_host(
            tx,
            Arc::new(PopupMenu::standard()),
            Duration::from_secs(10),
        )
        .unwrap();

        handles.host.request_close();

        assert_eq!(rx.try_recv().unwrap(), TrayMessage::CloseRequested);
        assert_eq!(rx.try_recv().unwrap(), TrayMessage::Destroyed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn null_shell_accepts_every_operation() {
        let shell = NullShell;
        for op in [ShellOp::Add, ShellOp::Modify, ShellOp::Delete] {
            shell.notify(op, &ShellRequest::bare(1)).unwrap();
        }
    }
}
