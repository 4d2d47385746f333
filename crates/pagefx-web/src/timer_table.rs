#![forbid(unsafe_code)]

//! Bookkeeping between [`TimerId`]s and host timer handles.
//!
//! Browser timers are identified by the integer `setInterval`/`setTimeout`
//! return. The table hands out our own ids (stable across hosts and cheap to
//! pass back through a JS callback argument) and remembers which host handle
//! and which clear function each one needs.

use std::collections::BTreeMap;

use core::time::Duration;

use pagefx_core::TimerId;

/// Which host call armed the timer; decides which clear call cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Repeating,
    Once,
}

/// A live host timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveTimer<H> {
    pub handle: H,
    pub kind: TimerKind,
}

/// Id allocator plus live-timer map.
#[derive(Debug)]
pub struct TimerTable<H> {
    next_id: u64,
    live: BTreeMap<TimerId, LiveTimer<H>>,
}

impl<H> TimerTable<H> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 1,
            live: BTreeMap::new(),
        }
    }

    /// Reserve a fresh id. Ids are never reused.
    pub fn allocate(&mut self) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn insert(&mut self, id: TimerId, handle: H, kind: TimerKind) {
        self.live.insert(id, LiveTimer { handle, kind });
    }

    /// Forget `id`, returning what the host needs to clear it.
    pub fn remove(&mut self, id: TimerId) -> Option<LiveTimer<H>> {
        self.live.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Remove every live timer, in id order.
    pub fn drain(&mut self) -> Vec<LiveTimer<H>> {
        core::mem::take(&mut self.live).into_values().collect()
    }
}

impl<H> Default for TimerTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a delay to the millisecond argument browser timer calls take.
///
/// Saturates at `i32::MAX` and never returns less than 1.
#[must_use]
pub fn delay_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_unique_and_start_at_one() {
        let mut table: TimerTable<i32> = TimerTable::new();
        let a = table.allocate();
        let b = table.allocate();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
    }

    #[test]
    fn remove_returns_the_clear_info_once() {
        let mut table = TimerTable::new();
        let id = table.allocate();
        table.insert(id, 42, TimerKind::Repeating);
        assert!(table.contains(id));
        assert_eq!(
            table.remove(id),
            Some(LiveTimer {
                handle: 42,
                kind: TimerKind::Repeating,
            })
        );
        assert_eq!(table.remove(id), None);
        assert!(table.is_empty());
    }

    #[test]
    fn drain_empties_the_table() {
        let mut table = TimerTable::new();
        for handle in [7, 8, 9] {
            let id = table.allocate();
            table.insert(id, handle, TimerKind::Once);
        }
        let drained: Vec<i32> = table.drain().into_iter().map(|t| t.handle).collect();
        assert_eq!(drained, vec![7, 8, 9]);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn delay_is_clamped_to_browser_range() {
        assert_eq!(delay_ms(Duration::ZERO), 1);
        assert_eq!(delay_ms(Duration::from_millis(2000)), 2000);
        assert_eq!(delay_ms(Duration::from_secs(u64::MAX)), i32::MAX);
    }
}
