#![forbid(unsafe_code)]

//! Autoplay timer: at most one live recurring timer per carousel.
//!
//! "Autoplay is running" is exactly "a [`TimerHandle`] is held". There is no
//! separate flag to drift out of sync with the handle.
//!
//! Stopping and restarting always resets the phase: the next tick lands one
//! full interval after the most recent [`Autoplay::start`].

use core::time::Duration;

use crate::scheduler::{Scheduler, TimerHandle, TimerId};

/// Recurring advance timer owned by one carousel.
#[derive(Debug)]
pub struct Autoplay {
    interval: Duration,
    handle: Option<TimerHandle>,
}

impl Autoplay {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    /// Dwell interval between automatic advances.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Id of the live timer, if any.
    #[must_use]
    pub fn timer_id(&self) -> Option<TimerId> {
        self.handle.as_ref().map(TimerHandle::id)
    }

    /// Whether a tick tagged `id` came from the live timer.
    #[must_use]
    pub fn owns(&self, id: TimerId) -> bool {
        self.timer_id() == Some(id)
    }

    /// Cancel any live timer, then arm a fresh one.
    ///
    /// Returns `None` and stays stopped when the scheduler could not arm the
    /// timer.
    pub fn start<K: Scheduler>(&mut self, scheduler: &mut K) -> Option<TimerId> {
        self.stop(scheduler);
        let handle = scheduler.schedule_repeating(self.interval);
        let id = handle.id();
        if !scheduler.is_armed(id) {
            tracing::warn!(timer = id.get(), "autoplay timer could not be armed");
            scheduler.cancel(handle);
            return None;
        }
        tracing::trace!(
            timer = id.get(),
            interval_ms = self.interval.as_millis() as u64,
            "autoplay armed"
        );
        self.handle = Some(handle);
        Some(id)
    }

    /// Cancel the live timer. Returns `false` when nothing was running.
    pub fn stop<K: Scheduler>(&mut self, scheduler: &mut K) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        tracing::trace!(timer = handle.id().get(), "autoplay disarmed");
        scheduler.cancel(handle);
        true
    }
}
