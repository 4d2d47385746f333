#![forbid(unsafe_code)]

//! Slide registry: the ordered slides, their paired dots, and the current index.
//!
//! # Invariants
//!
//! 1. For a non-empty registry exactly one slide carries [`Marker::Active`],
//!    and the dot at the same index (if any) carries `Active` and `Selected`.
//! 2. `current_index()` is always in `[0, len)` when `len > 0`.
//! 3. Navigation targets outside the range wrap with a true modulo; they are
//!    never clamped and never rejected.
//!
//! Dots are optional. Markup with fewer dots than slides is tolerated: updates
//! for indices without a dot are skipped.

use crate::marker::{Marker, MarkerSink};

/// Wrap an arbitrary target onto `[0, len)`.
///
/// Returns `None` for an empty registry.
#[must_use]
pub fn wrap_index(target: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    Some(target.rem_euclid(len) as usize)
}

/// Ordered slides and dots with index-bounded navigation.
#[derive(Debug, Clone)]
pub struct SlideRegistry<S, D> {
    slides: Vec<S>,
    dots: Vec<D>,
    current: usize,
}

impl<S: MarkerSink, D: MarkerSink> SlideRegistry<S, D> {
    /// Register slides and dots in document order.
    ///
    /// Markers are normalized so slide `0` (and dot `0`) start active and
    /// every other element starts cleared, whatever the markup said.
    #[must_use]
    pub fn new(slides: Vec<S>, dots: Vec<D>) -> Self {
        let mut registry = Self {
            slides,
            dots,
            current: 0,
        };
        registry.sync_markers();
        registry
    }

    fn sync_markers(&mut self) {
        let current = self.current;
        let has_slides = !self.slides.is_empty();
        for (idx, slide) in self.slides.iter_mut().enumerate() {
            slide.set_marker(Marker::Active, idx == current);
        }
        for (idx, dot) in self.dots.iter_mut().enumerate() {
            let on = has_slides && idx == current;
            dot.set_marker(Marker::Active, on);
            dot.set_marker(Marker::Selected, on);
        }
    }

    fn mark(&mut self, idx: usize, on: bool) {
        if let Some(slide) = self.slides.get_mut(idx) {
            slide.set_marker(Marker::Active, on);
        }
        if let Some(dot) = self.dots.get_mut(idx) {
            dot.set_marker(Marker::Active, on);
            dot.set_marker(Marker::Selected, on);
        }
    }

    /// Move to `target`, wrapping modulo `len`. Returns the new index.
    ///
    /// Going to the current index re-activates it; an empty registry is a
    /// no-op.
    pub fn go_to(&mut self, target: i64) -> usize {
        let Some(next) = wrap_index(target, self.slides.len()) else {
            return self.current;
        };
        self.mark(self.current, false);
        self.current = next;
        self.mark(next, true);
        next
    }

    /// Advance by one slide.
    pub fn next(&mut self) -> usize {
        self.go_to(self.current as i64 + 1)
    }

    /// Step back by one slide.
    pub fn prev(&mut self) -> usize {
        self.go_to(self.current as i64 - 1)
    }
}

impl<S, D> SlideRegistry<S, D> {
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    #[must_use]
    pub fn slides(&self) -> &[S] {
        &self.slides
    }

    #[must_use]
    pub fn dots(&self) -> &[D] {
        &self.dots
    }
}
