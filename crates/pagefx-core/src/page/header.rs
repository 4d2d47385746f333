#![forbid(unsafe_code)]

//! Scroll-reactive header.
//!
//! Scroll events arrive far more often than frames. [`HeaderScroll`] lets at
//! most one animation frame be pending at a time and only reports a change
//! when the header crosses the threshold.

/// Header scrolled-state tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderScroll {
    threshold: f64,
    scrolled: bool,
    frame_pending: bool,
}

impl HeaderScroll {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            scrolled: false,
            frame_pending: false,
        }
    }

    /// Record a scroll event. Returns `true` when the host should request an
    /// animation frame.
    pub fn on_scroll(&mut self) -> bool {
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Run the pending frame at scroll offset `scroll_y`.
    ///
    /// Returns the new scrolled state when it changed.
    pub fn on_frame(&mut self, scroll_y: f64) -> Option<bool> {
        self.frame_pending = false;
        let scrolled = scroll_y > self.threshold;
        if scrolled == self.scrolled {
            return None;
        }
        self.scrolled = scrolled;
        Some(scrolled)
    }

    #[must_use]
    pub const fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_burst_requests_one_frame() {
        let mut h = HeaderScroll::new(100.0);
        assert!(h.on_scroll());
        assert!(!h.on_scroll());
        assert!(!h.on_scroll());
        assert_eq!(h.on_frame(50.0), None);
        assert!(h.on_scroll());
    }

    #[test]
    fn reports_threshold_crossings_only() {
        let mut h = HeaderScroll::new(100.0);
        h.on_scroll();
        assert_eq!(h.on_frame(100.0), None);
        h.on_scroll();
        assert_eq!(h.on_frame(101.0), Some(true));
        h.on_scroll();
        assert_eq!(h.on_frame(900.0), None);
        assert!(h.is_scrolled());
        h.on_scroll();
        assert_eq!(h.on_frame(0.0), Some(false));
    }
}
