#![forbid(unsafe_code)]

//! Smooth scrolling for in-page anchor links.

/// Fragment selector for an in-page link, or `None` when the link should be
/// left to the browser (bare `#`, or not a fragment link at all).
#[must_use]
pub fn anchor_target(href: &str) -> Option<&str> {
    if href.starts_with('#') && href.len() > 1 {
        Some(href)
    } else {
        None
    }
}

/// Document scroll offset that puts an anchor target just below a fixed
/// header.
///
/// `target_top` is the target's viewport-relative top, `page_y` the current
/// scroll offset.
#[must_use]
pub fn anchor_scroll_top(target_top: f64, page_y: f64, header_height: f64, gap: f64) -> f64 {
    target_top + page_y - header_height - gap
}
