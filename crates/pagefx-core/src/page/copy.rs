#![forbid(unsafe_code)]

//! Clipboard copy feedback on `[data-copy]` buttons.
//!
//! After a successful copy the button shows a feedback label for a fixed
//! duration, then reverts. A second copy while the feedback shows keeps the
//! button's real label and restarts the revert timer, so the button never
//! ends up permanently labelled with the feedback text.

use core::time::Duration;

use crate::scheduler::{Scheduler, TimerHandle, TimerId};

/// What the host should render on the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyView {
    pub label: String,
    /// Whether the copied class is present.
    pub copied: bool,
}

/// Feedback state for one button.
#[derive(Debug)]
pub struct CopyFeedback {
    feedback_label: String,
    duration: Duration,
    original: Option<String>,
    revert: Option<TimerHandle>,
}

impl CopyFeedback {
    #[must_use]
    pub fn new(feedback_label: impl Into<String>, duration: Duration) -> Self {
        Self {
            feedback_label: feedback_label.into(),
            duration,
            original: None,
            revert: None,
        }
    }

    #[must_use]
    pub const fn is_showing(&self) -> bool {
        self.revert.is_some()
    }

    /// Id of the pending revert timer, if any.
    #[must_use]
    pub fn timer_id(&self) -> Option<TimerId> {
        self.revert.as_ref().map(TimerHandle::id)
    }

    /// The clipboard write succeeded while the button read `current_label`.
    pub fn copied<K: Scheduler>(&mut self, current_label: &str, scheduler: &mut K) -> CopyView {
        if self.original.is_none() {
            self.original = Some(current_label.to_owned());
        }
        if let Some(previous) = self.revert.take() {
            scheduler.cancel(previous);
        }
        self.revert = Some(scheduler.schedule_once(self.duration));
        CopyView {
            label: self.feedback_label.clone(),
            copied: true,
        }
    }

    /// Deliver a scheduler tick. Returns the reverted view when `id` is this
    /// button's revert timer.
    pub fn tick<K: Scheduler>(&mut self, id: TimerId, scheduler: &mut K) -> Option<CopyView> {
        if self.timer_id() != Some(id) {
            return None;
        }
        if let Some(handle) = self.revert.take() {
            scheduler.cancel(handle);
        }
        let label = self.original.take().unwrap_or_default();
        Some(CopyView {
            label,
            copied: false,
        })
    }
}
