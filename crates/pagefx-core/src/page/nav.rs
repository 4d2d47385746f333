#![forbid(unsafe_code)]

//! Mobile navigation overlay with body scroll lock.
//!
//! Opening locks the body at the current scroll offset (the host pins it with
//! a negative `top`); closing unlocks it and restores that offset. Closing an
//! overlay that is already closed does nothing, so a desktop media-query
//! change on a closed menu never moves the page.

/// Change the host must apply to the DOM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEffect {
    /// Add the open classes, set `aria-expanded="true"` and pin the body at
    /// `top: -{scroll_y}px`.
    Opened { scroll_y: f64 },
    /// Remove the open classes, set `aria-expanded="false"`, unpin the body
    /// and scroll back to `restore_scroll_y`.
    Closed {
        restore_scroll_y: f64,
        /// Return keyboard focus to the toggle button.
        refocus_toggle: bool,
    },
}

/// Navigation overlay state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavOverlay {
    open: bool,
    saved_scroll_y: f64,
}

impl NavOverlay {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            open: false,
            saved_scroll_y: 0.0,
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Toggle button clicked at scroll offset `scroll_y`.
    pub fn toggle(&mut self, scroll_y: f64) -> Option<NavEffect> {
        if self.open {
            self.close()
        } else {
            self.open(scroll_y)
        }
    }

    pub fn open(&mut self, scroll_y: f64) -> Option<NavEffect> {
        if self.open {
            return None;
        }
        self.open = true;
        self.saved_scroll_y = scroll_y;
        Some(NavEffect::Opened { scroll_y })
    }

    pub fn close(&mut self) -> Option<NavEffect> {
        self.close_with(false)
    }

    fn close_with(&mut self, refocus_toggle: bool) -> Option<NavEffect> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(NavEffect::Closed {
            restore_scroll_y: self.saved_scroll_y,
            refocus_toggle,
        })
    }

    /// Document-level key press. Escape closes an open menu and hands focus
    /// back to the toggle.
    pub fn key(&mut self, key: &str) -> Option<NavEffect> {
        if key == "Escape" {
            self.close_with(true)
        } else {
            None
        }
    }

    /// The desktop media query changed.
    pub fn viewport_changed(&mut self, matches_desktop: bool) -> Option<NavEffect> {
        if matches_desktop { self.close() } else { None }
    }

    /// A navigation link or the overlay backdrop was clicked.
    pub fn dismiss(&mut self) -> Option<NavEffect> {
        self.close()
    }
}
