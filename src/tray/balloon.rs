use super::message::TrayMessage;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// One-shot timer that clears a balloon notification after the duration
/// the shell displayed it for.
///
/// At most one timer is armed at a time: arming cancels the previous
/// task first. A cancelled task can still have queued its expiry
/// message before the abort landed, so every expiry carries the
/// generation it was armed for and stale generations are rejected.
pub struct BalloonTimer {
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl BalloonTimer {
    pub fn new() -> Self {
        Self {
            task: None,
            generation: 0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Arms the auto-clear timer, preempting any active one.
    pub fn arm(&mut self, timeout: Duration, tx: UnboundedSender<TrayMessage>) {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(TrayMessage::BalloonExpired { generation });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// True when `generation` is the currently armed timer's expiry.
    pub fn accepts(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }
}

impl Default for BalloonTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BalloonTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
