#![forbid(unsafe_code)]

//! Presentation markers toggled on slide and dot elements.
//!
//! The carousel never touches the DOM. It asks a [`MarkerSink`] to switch a
//! small fixed set of markers on or off, and the host decides what that means
//! (a CSS class, an ARIA attribute, a field in a test double).

/// Presentational marker carried by a slide or dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The element is the visible slide, or the dot paired with it.
    Active,
    /// Assistive-technology selection state; only dots carry it.
    Selected,
}

/// Receiver for marker updates.
pub trait MarkerSink {
    /// Switch `marker` on or off.
    fn set_marker(&mut self, marker: Marker, on: bool);
}

/// In-memory element that records its markers.
///
/// Used by native tests, session replay, and any host without a DOM.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordedElement {
    pub active: bool,
    pub selected: bool,
    /// Number of marker writes received.
    pub writes: u32,
}

impl RecordedElement {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: false,
            selected: false,
            writes: 0,
        }
    }

    /// Build `n` fresh elements.
    #[must_use]
    pub fn many(n: usize) -> Vec<Self> {
        vec![Self::new(); n]
    }
}

impl MarkerSink for RecordedElement {
    fn set_marker(&mut self, marker: Marker, on: bool) {
        self.writes = self.writes.saturating_add(1);
        match marker {
            Marker::Active => self.active = on,
            Marker::Selected => self.selected = on,
        }
    }
}
