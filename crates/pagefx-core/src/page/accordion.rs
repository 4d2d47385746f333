#![forbid(unsafe_code)]

//! FAQ accordion keyboard support.

/// Whether a DOM `key` on a FAQ question toggles its item open or closed.
///
/// The host prevents the default action for these keys.
#[must_use]
pub fn is_disclosure_toggle_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}
