//! UPS status as seen by the tray: the raw device code, the opaque
//! status line, and the four-way power state derived from them.
//!
//! The monitoring subsystem that talks to the UPS lives outside this
//! crate; it publishes through a [`SharedStatus`] handle and the tray
//! only ever reads snapshots.

use std::sync::{Arc, RwLock};

/// Discrete power state derived from the raw device code.
///
/// The mapping is a total partition of the code space: every integer
/// lands in exactly one state, so there is no fallback variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    CommLost,
    OnBattery,
    Charging,
    Online,
}

impl PowerState {
    /// Negative codes mean communication with the UPS is lost, zero
    /// means running on battery, 1..=99 is the charging percentage and
    /// anything at or above 100 is online/full.
    pub fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            PowerState::CommLost
        } else if raw == 0 {
            PowerState::OnBattery
        } else if raw < 100 {
            PowerState::Charging
        } else {
            PowerState::Online
        }
    }
}

/// One observation of the UPS: raw code plus the human-readable status
/// line, consumed as opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub raw_code: i32,
    pub status_text: String,
}

impl StatusSnapshot {
    pub fn new(raw_code: i32, status_text: impl Into<String>) -> Self {
        Self {
            raw_code,
            status_text: status_text.into(),
        }
    }

    pub fn state(&self) -> PowerState {
        PowerState::from_raw(self.raw_code)
    }
}

/// Pure query interface the tray polls; no side effects.
pub trait StatusSource: Send + Sync {
    fn snapshot(&self) -> StatusSnapshot;
}

/// Process-wide status cell. The monitoring subsystem writes through
/// `publish`, the tray reads snapshots on every poll tick.
#[derive(Clone)]
pub struct SharedStatus {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl SharedStatus {
    pub fn new(initial: StatusSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Starts out as communication-lost until the monitor reports in.
    pub fn comm_lost() -> Self {
        Self::new(StatusSnapshot::new(-1, "COMMLOST"))
    }

    pub fn publish(&self, raw_code: i32, status_text: impl Into<String>) {
        let mut guard = self.inner.write().unwrap();
        *guard = StatusSnapshot::new(raw_code, status_text);
    }
}

impl StatusSource for SharedStatus {
    fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_code_partition_has_no_gaps() {
        let cases = [
            (i32::MIN, PowerState::CommLost),
            (-2, PowerState::CommLost),
            (-1, PowerState::CommLost),
            (0, PowerState::OnBattery),
            (1, PowerState::Charging),
            (50, PowerState::Charging),
            (99, PowerState::Charging),
            (100, PowerState::Online),
            (101, PowerState::Online),
            (i32::MAX, PowerState::Online),
        ];

        for (raw, expected) in cases {
            assert_eq!(PowerState::from_raw(raw), expected, "raw code {}", raw);
        }
    }

    #[test]
    fn snapshot_exposes_derived_state() {
        let snapshot = StatusSnapshot::new(42, "CHARGING");
        assert_eq!(snapshot.state(), PowerState::Charging);
        assert_eq!(snapshot.status_text, "CHARGING");
    }

    #[test]
    fn shared_status_starts_comm_lost() {
        let status = SharedStatus::comm_lost();
        let snapshot = status.snapshot();
        assert_eq!(snapshot.state(), PowerState::CommLost);
        assert_eq!(snapshot.status_text, "COMMLOST");
    }

    #[test]
    fn publish_replaces_the_whole_snapshot() {
        let status = SharedStatus::comm_lost();
        status.publish(100, "ONLINE");

        let snapshot = status.snapshot();
        assert_eq!(snapshot.raw_code, 100);
        assert_eq!(snapshot.state(), PowerState::Online);
        assert_eq!(snapshot.status_text, "ONLINE");
    }

    #[test]
    fn clones_observe_the_same_cell() {
        let status = SharedStatus::comm_lost();
        let reader = status.clone();

        status.publish(0, "ONBATT");
        assert_eq!(reader.snapshot().state(), PowerState::OnBattery);
    }
}
