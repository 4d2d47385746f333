#![forbid(unsafe_code)]

//! One-shot page behaviors that sit next to the carousel.
//!
//! Each submodule holds only the decision logic; `pagefx-web` applies the
//! resulting class, attribute and scroll changes to the DOM. None of these
//! share state with the carousel.

pub mod accordion;
pub mod anchor;
pub mod copy;
pub mod header;
pub mod links;
pub mod nav;

pub use accordion::is_disclosure_toggle_key;
pub use anchor::{anchor_scroll_top, anchor_target};
pub use copy::{CopyFeedback, CopyView};
pub use header::HeaderScroll;
pub use links::{EXTERNAL_REL, EXTERNAL_TARGET, is_external};
pub use nav::{NavEffect, NavOverlay};
