#![forbid(unsafe_code)]

//! Core: deterministic page-behavior logic for the pagefx marketing page.
//!
//! # Role in pagefx
//! `pagefx-core` owns every decision the page makes and none of the DOM.
//! The web host (`pagefx-web`) discovers markup, forwards browser events,
//! and applies the presentation markers this crate asks for.
//!
//! # Primary responsibilities
//! - **Carousel**: the phone-slider state machine ([`carousel`]), built from a
//!   slide registry ([`registry`]), an autoplay timer ([`autoplay`]) and an
//!   input coordinator.
//! - **Scheduler**: the timer capability ([`scheduler`]) with a host-driven
//!   [`scheduler::ManualScheduler`] for native tests and replay.
//! - **Input**: the encoded input schema shared with the web host ([`input`])
//!   and JSONL session replay ([`session`]).
//! - **Page collaborators**: navigation overlay, header scroll, anchors,
//!   accordion, copy feedback and link hardening ([`page`]).
//!
//! # Determinism
//! Time only advances through a [`scheduler::Scheduler`]. Nothing in this
//! crate reads a wall clock, so identical inputs replay to identical states.

pub mod autoplay;
pub mod carousel;
pub mod config;
pub mod input;
pub mod marker;
pub mod page;
pub mod registry;
pub mod scheduler;
pub mod session;

pub use carousel::{AutoplayCommand, Carousel, SliderDispatch, SliderState};
pub use config::{ConfigError, PageConfig, SliderConfig, SliderMarkup};
pub use input::{InputParseError, SliderInput, SliderKey, Visibility};
pub use marker::{Marker, MarkerSink, RecordedElement};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TimerId};
