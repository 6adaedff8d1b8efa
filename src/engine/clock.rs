//! Cancellable one-second countdown task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Returned by the tick callback to keep or stop the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockControl {
    Continue,
    Stop,
}

/// Owns the spawned 1 Hz tick loop for a match. `cancel` aborts the task
/// synchronously; a callback that was already blocked on the engine lock
/// when the match paused or ended is discarded by the engine's own phase
/// re-check.
pub struct TurnClock {
    handle: Option<JoinHandle<()>>,
}

impl TurnClock {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Spawn the tick loop, replacing a running one. The callback fires
    /// once per second until it returns `Stop` or the clock is cancelled.
    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> ClockControl + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the countdown starts a full second after `start`.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if on_tick() == ClockControl::Stop {
                    break;
                }
            }
        }));
    }

    /// Abort the tick task. Safe to call repeatedly or when nothing runs.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TurnClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
