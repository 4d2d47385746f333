#![forbid(unsafe_code)]

//! Timer capability and a deterministic, host-driven implementation.
//!
//! A running timer is represented by an owned [`TimerHandle`]. The handle is
//! not `Clone`: whoever holds it is the only party that can cancel the timer,
//! and cancelling consumes it. Each tick a scheduler delivers is tagged with
//! the [`TimerId`] that produced it, so a consumer can drop ticks from handles
//! it has already given back.
//!
//! [`ManualScheduler`] never reads a wall clock. The host (a test, a replay,
//! or a JS shim) moves time forward and pulls due ticks one at a time in
//! deadline order.

use core::time::Duration;
use std::collections::BTreeMap;

/// Shortest interval a repeating timer is armed with.
///
/// A zero interval would make every advance spin forever.
pub const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

/// Identity of one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Owned handle to a live timer.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a dropped handle can never be cancelled; give it back to Scheduler::cancel"]
pub struct TimerHandle {
    id: TimerId,
}

impl TimerHandle {
    /// Wrap a freshly scheduled timer. Only schedulers should call this.
    pub const fn new(id: TimerId) -> Self {
        Self { id }
    }

    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }
}

/// Source of recurring and one-shot timers.
///
/// Implementations must guarantee that after [`Scheduler::cancel`] returns,
/// no further tick tagged with that handle's id is delivered.
pub trait Scheduler {
    /// Arm a timer that fires every `interval`, first after one full interval.
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle;

    /// Arm a timer that fires once after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle;

    /// Disarm a timer. Cancelling a one-shot that already fired is a no-op.
    fn cancel(&mut self, handle: TimerHandle);

    /// Whether the timer behind `id` is actually armed.
    ///
    /// Schedulers backed by a host that can refuse a timer return `false`
    /// for ids whose arming failed, so callers never treat a dead handle as
    /// a running timer.
    fn is_armed(&self, id: TimerId) -> bool {
        let _ = id;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ManualTimer {
    due: Duration,
    repeat: Option<Duration>,
}

/// Deterministic scheduler controlled by the host.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, ManualTimer>,
}

impl ManualScheduler {
    /// Create a scheduler whose clock starts at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: BTreeMap::new(),
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Whether `id` is still armed.
    #[must_use]
    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Earliest deadline across all armed timers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Pop the earliest tick due at or before `limit`.
    ///
    /// The clock moves to the tick's deadline. Repeating timers are re-armed
    /// one interval after that deadline; one-shots are disarmed. A repeating
    /// timer whose next deadline would overflow [`Duration`] is disarmed
    /// after this tick, so draining up to `Duration::MAX` terminates.
    pub fn pop_due(&mut self, limit: Duration) -> Option<TimerId> {
        let (id, timer) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(id, t)| (t.due, **id))
            .map(|(id, t)| (*id, *t))?;
        self.now = self.now.max(timer.due);
        match timer.repeat {
            Some(interval) => match timer.due.checked_add(interval) {
                Some(next) => {
                    if let Some(armed) = self.timers.get_mut(&id) {
                        armed.due = next;
                    }
                }
                None => {
                    tracing::trace!(id = id.get(), "repeating timer ran past the clock range");
                    self.timers.remove(&id);
                }
            },
            None => {
                self.timers.remove(&id);
            }
        }
        Some(id)
    }

    /// Move the clock to `target` without delivering ticks.
    ///
    /// Time never runs backwards; earlier targets are ignored.
    pub fn advance_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }

    /// Advance by `dt`, returning every tick due along the way in order.
    ///
    /// Every tick is materialized, so the cost is linear in the number of
    /// ticks due before `now + dt`. Hosts driving long idle stretches should
    /// use [`Self::advance_to`] when they do not need the ticks.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerId> {
        let target = self.now.saturating_add(dt);
        let mut fired = Vec::new();
        while let Some(id) = self.pop_due(target) {
            fired.push(id);
        }
        self.advance_to(target);
        fired
    }

    fn arm(&mut self, delay: Duration, repeat: Option<Duration>) -> TimerHandle {
        let id = TimerId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.timers.insert(
            id,
            ManualTimer {
                due: self.now.saturating_add(delay),
                repeat,
            },
        );
        TimerHandle::new(id)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        self.arm(interval, Some(interval))
    }

    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.arm(delay, None)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.remove(&handle.id());
    }

    fn is_armed(&self, id: TimerId) -> bool {
        self.is_live(id)
    }
}
