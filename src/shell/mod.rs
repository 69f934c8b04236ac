//! The shell notification contract: everything the tray asks of the
//! notification area, expressed as data.
//!
//! The controller side builds [`ShellRequest`] values; a platform
//! backend turns them into real `Shell_NotifyIconW` calls. Keeping the
//! contract as plain data is what lets the whole state machine run
//! against a recording fake in tests.

use crate::status::PowerState;
use anyhow::Result;
use std::time::Duration;

/// Tray icon artwork, one per power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Online,
    OnBattery,
    Charging,
    CommLost,
}

impl Glyph {
    /// Total lookup from power state to artwork. CommLost and OnBattery
    /// take priority over the charge-level states, matching the order
    /// the raw code is partitioned in.
    pub fn for_state(state: PowerState) -> Glyph {
        match state {
            PowerState::CommLost => Glyph::CommLost,
            PowerState::OnBattery => Glyph::OnBattery,
            PowerState::Charging => Glyph::Charging,
            PowerState::Online => Glyph::Online,
        }
    }
}

/// The three operations the notification area understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOp {
    Add,
    Modify,
    Delete,
}

/// NIF-style payload validity bits.
pub mod flags {
    /// Callback message id is valid.
    pub const MESSAGE: u32 = 0x0001;
    /// Icon handle is valid.
    pub const ICON: u32 = 0x0002;
    /// Tooltip text is valid.
    pub const TIP: u32 = 0x0004;
    /// Balloon info fields are valid.
    pub const INFO: u32 = 0x0010;
}

/// Balloon notification fields. Empty strings and a zero timeout clear
/// any balloon currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalloonContent {
    pub title: String,
    pub body: String,
    pub timeout: Duration,
}

impl BalloonContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>, timeout: Duration) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            timeout,
        }
    }

    pub fn clear() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            timeout: Duration::ZERO,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.title.is_empty() && self.body.is_empty() && self.timeout.is_zero()
    }
}

/// One notification-area request. Fields are only meaningful when the
/// matching validity bit is set in `flags`, mirroring the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// Stable numeric id of the single tray slot.
    pub id: u32,
    pub flags: u32,
    pub glyph: Option<Glyph>,
    pub tooltip: Option<String>,
    /// Callback message id delivered with pointer events on the icon.
    pub callback: Option<u32>,
    pub balloon: Option<BalloonContent>,
}

impl ShellRequest {
    pub fn bare(id: u32) -> Self {
        Self {
            id,
            flags: 0,
            glyph: None,
            tooltip: None,
            callback: None,
            balloon: None,
        }
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Sink for notification-area requests. Implemented by the Windows
/// backend in production and by recording fakes in tests.
pub trait Shell: Send + Sync {
    fn notify(&self, op: ShellOp, request: &ShellRequest) -> Result<()>;
}

/// Tooltip capacity in UTF-16 units, excluding the terminator.
pub const TOOLTIP_MAX_UTF16: usize = 127;

/// Clips tooltip text to the platform buffer, never splitting a
/// character. Overflow truncates rather than fails.
pub fn truncate_tooltip(text: &str) -> String {
    let mut units = 0usize;
    let mut out = String::new();
    for ch in text.chars() {
        units += ch.len_utf16();
        if units > TOOLTIP_MAX_UTF16 {
            break;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_lookup_is_total_and_ordered() {
        let cases = [
            (PowerState::CommLost, Glyph::CommLost),
            (PowerState::OnBattery, Glyph::OnBattery),
            (PowerState::Online, Glyph::Online),
            (PowerState::Charging, Glyph::Charging),
        ];

        for (state, expected) in cases {
            assert_eq!(Glyph::for_state(state), expected, "state {:?}", state);
        }
    }

    #[test]
    fn short_tooltips_pass_through() {
        assert_eq!(truncate_tooltip("Apcupsd - ONLINE"), "Apcupsd - ONLINE");
        assert_eq!(truncate_tooltip(""), "");
    }

    #[test]
    fn long_tooltips_truncate_to_the_buffer_limit() {
        let long = "x".repeat(300);
        let clipped = truncate_tooltip(&long);
        assert_eq!(clipped.encode_utf16().count(), TOOLTIP_MAX_UTF16);
    }

    #[test]
    fn truncation_never_splits_a_character() {
        // 127 units of padding would leave room for only half of a
        // surrogate pair; the whole character must be dropped instead.
        let text = format!("{}\u{1F50B}", "x".repeat(126));
        let clipped = truncate_tooltip(&text);
        assert_eq!(clipped, "x".repeat(126));
        assert!(clipped.encode_utf16().count() <= TOOLTIP_MAX_UTF16);
    }

    #[test]
    fn exactly_at_the_limit_is_kept() {
        let text = "y".repeat(TOOLTIP_MAX_UTF16);
        assert_eq!(truncate_tooltip(&text), text);
    }

    #[test]
    fn clear_balloon_is_empty_with_zero_timeout() {
        let clear = BalloonContent::clear();
        assert!(clear.is_clear());
        assert!(!BalloonContent::new("t", "", Duration::ZERO).is_clear());
        assert!(!BalloonContent::new("", "", Duration::from_millis(1)).is_clear());
    }

    #[test]
    fn request_flag_queries() {
        let mut request = ShellRequest::bare(7);
        request.flags = flags::ICON | flags::TIP;

        assert!(request.has_flag(flags::ICON));
        assert!(request.has_flag(flags::TIP));
        assert!(!request.has_flag(flags::MESSAGE));
        assert!(!request.has_flag(flags::INFO));
    }
}
