#![forbid(unsafe_code)]

//! WASM host for pagefx.
//!
//! The host discovers markup, forwards browser events into `pagefx-core` and
//! applies the markers and effects the core asks for. All decisions live in
//! the core; this crate only translates between them and the DOM.
//!
//! Only the `wasm32` build contains DOM code. The attribute config loader
//! and the timer table are plain Rust so they build and test natively.

pub mod host_config;
pub mod timer_table;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod scheduler;
#[cfg(target_arch = "wasm32")]
mod slider;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use slider::PhoneSlider;
#[cfg(target_arch = "wasm32")]
pub use wasm::{init_page, start};
