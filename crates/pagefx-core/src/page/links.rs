#![forbid(unsafe_code)]

//! External-link hardening.

/// `rel` value applied to external links.
pub const EXTERNAL_REL: &str = "noopener noreferrer";
/// `target` value applied to external links.
pub const EXTERNAL_TARGET: &str = "_blank";

/// Whether an absolute `http…` link points away from `hostname`.
///
/// Links without an `http` scheme are never external. An empty hostname
/// (e.g. a `file:` page) makes every `http…` link external.
#[must_use]
pub fn is_external(href: &str, hostname: &str) -> bool {
    if !href.starts_with("http") {
        return false;
    }
    hostname.is_empty() || !href.contains(hostname)
}
