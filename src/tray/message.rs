use std::time::Duration;

/// Commands reachable from the popup menu, with the stable ids the
/// platform menu reports selections through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Status,
    Events,
    About,
    Close,
}

impl MenuCommand {
    pub fn id(self) -> u32 {
        match self {
            MenuCommand::Status => 1001,
            MenuCommand::Events => 1002,
            MenuCommand::About => 1003,
            MenuCommand::Close => 1004,
        }
    }

    pub fn from_id(id: u32) -> Option<MenuCommand> {
        match id {
            1001 => Some(MenuCommand::Status),
            1002 => Some(MenuCommand::Events),
            1003 => Some(MenuCommand::About),
            1004 => Some(MenuCommand::Close),
            _ => None,
        }
    }
}

/// Everything the host can deliver to the dispatcher. The platform pump
/// forwards only messages it understands; anything else stays with
/// default OS handling and never shows up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayMessage {
    /// Recurring poll timer fired; refresh the icon.
    PollTick,
    /// The shell reported a balloon on screen for the given duration.
    BalloonShown { timeout: Duration },
    /// The auto-clear timer armed for `generation` expired.
    BalloonExpired { generation: u64 },
    /// A menu entry was selected (via popup or synthesized).
    Menu(MenuCommand),
    IconRightClick,
    IconDoubleClick,
    /// The window was asked to close; destruction follows via default
    /// handling.
    CloseRequested,
    /// The window is gone; terminal.
    Destroyed,
    /// The session is ending; `logging_off` distinguishes logoff from
    /// shutdown/kill.
    SessionEnding { logging_off: bool },
}

/// Outcome of one dispatch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_ids_round_trip() {
        let commands = [
            MenuCommand::Status,
            MenuCommand::Events,
            MenuCommand::About,
            MenuCommand::Close,
        ];

        for command in commands {
            assert_eq!(MenuCommand::from_id(command.id()), Some(command));
        }
    }

    #[test]
    fn unknown_ids_map_to_none() {
        for id in [0, 1, 1000, 1005, u32::MAX] {
            assert_eq!(MenuCommand::from_id(id), None, "id {}", id);
        }
    }
}
