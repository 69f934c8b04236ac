use super::message::MenuCommand;
use std::sync::atomic::{AtomicBool, Ordering};

/// One popup entry: a command plus its label as rendered by the
/// platform menu.
#[derive(Debug, Clone, Copy)]
pub struct MenuEntry {
    pub command: MenuCommand,
    pub label: &'static str,
}

/// The tray context menu model. Entry 0 is the default item and the
/// double-click target; the platform rebuilds the real menu from this
/// model every time it is displayed.
///
/// `Close` starts out disabled and is enabled once the tray icon is
/// confirmed present, so the only exit path through the menu cannot
/// leave a dangling icon behind.
pub struct PopupMenu {
    entries: Vec<MenuEntry>,
    close_enabled: AtomicBool,
}

impl PopupMenu {
    pub fn standard() -> Self {
        Self {
            entries: vec![
                MenuEntry { command: MenuCommand::Status, label: "&Status" },
                MenuEntry { command: MenuCommand::Events, label: "&Events" },
                MenuEntry { command: MenuCommand::About, label: "&About" },
                MenuEntry { command: MenuCommand::Close, label: "&Close" },
            ],
            close_enabled: AtomicBool::new(false),
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The default (bold) entry, also dispatched on double-click.
    pub fn default_entry(&self) -> Option<&MenuEntry> {
        self.entries.first()
    }

    pub fn set_close_enabled(&self, enabled: bool) {
        self.close_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn close_enabled(&self) -> bool {
        self.close_enabled.load(Ordering::SeqCst)
    }

    /// Whether the entry may currently be selected.
    pub fn is_enabled(&self, command: MenuCommand) -> bool {
        match command {
            MenuCommand::Close => self.close_enabled(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_menu_layout() {
        let menu = PopupMenu::standard();
        let commands: Vec<_> = menu.entries().iter().map(|e| e.command).collect();
        assert_eq!(
            commands,
            vec![
                MenuCommand::Status,
                MenuCommand::Events,
                MenuCommand::About,
                MenuCommand::Close,
            ]
        );
    }

    #[test]
    fn default_entry_is_status() {
        let menu = PopupMenu::standard();
        assert_eq!(menu.default_entry().unwrap().command, MenuCommand::Status);
    }

    #[test]
    fn close_starts_disabled_until_icon_confirmed() {
        let menu = PopupMenu::standard();
        assert!(!menu.is_enabled(MenuCommand::Close));
        assert!(menu.is_enabled(MenuCommand::Status));
        assert!(menu.is_enabled(MenuCommand::Events));
        assert!(menu.is_enabled(MenuCommand::About));

        menu.set_close_enabled(true);
        assert!(menu.is_enabled(MenuCommand::Close));
    }
}
