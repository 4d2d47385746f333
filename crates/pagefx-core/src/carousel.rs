#![forbid(unsafe_code)]

//! Phone-slider carousel: slide registry, autoplay timer and input coordinator.
//!
//! # State Machine
//!
//! The coordinator has two states, derived from whether the autoplay timer
//! holds a handle:
//!
//! - **Idle**: no timer. Initial state, and the state after a touch begins or
//!   the root leaves the viewport.
//! - **Autoplaying**: one recurring timer advances the registry each tick.
//!
//! | Input                         | Registry        | Timer   |
//! |-------------------------------|-----------------|---------|
//! | dot `i` clicked               | `go_to(i)`      | restart |
//! | `ArrowLeft` / `ArrowRight`    | `prev` / `next` | restart |
//! | touch start                   | -               | stop    |
//! | touch end, `dx >= threshold`  | `prev` if right, `next` if left | restart |
//! | touch end, short or no start  | -               | restart |
//! | touch cancel                  | -               | restart |
//! | root visible (ratio >= 5%)    | -               | restart |
//! | root hidden (ratio < 5%)      | -               | stop    |
//!
//! # Invariants
//!
//! 1. Every dispatch finishes its registry update before its timer action, so
//!    a tick can never run against a stale index.
//! 2. At most one timer is live. Restarting cancels the old handle first, and
//!    ticks tagged with a cancelled id are dropped in [`Carousel::tick`].
//! 3. Keys other than the two arrows change nothing, including the timer.
//!
//! # Failure Modes
//!
//! A page without slides produces no carousel at all
//! ([`Carousel::discover`] returns `None`); the host attaches nothing.

use core::time::Duration;

use crate::autoplay::Autoplay;
use crate::config::SliderConfig;
use crate::input::{SliderInput, SliderKey, Visibility};
use crate::marker::MarkerSink;
use crate::registry::SlideRegistry;
use crate::scheduler::{ManualScheduler, Scheduler, TimerId};

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderState {
    Idle,
    Autoplaying,
}

/// Timer action taken by one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoplayCommand {
    /// Any live timer was cancelled and a fresh one armed.
    Restarted,
    /// Any live timer was cancelled.
    Stopped,
    /// The timer was left alone.
    Unchanged,
}

/// Record of one coordinator dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderDispatch {
    pub input: SliderInput,
    pub from_index: usize,
    pub to_index: usize,
    /// Whether the registry was asked to navigate (it may land on the same
    /// index in a one-slide carousel).
    pub navigated: bool,
    pub autoplay: AutoplayCommand,
    pub state: SliderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigation {
    To(usize),
    Prev,
    Next,
}

/// Carousel aggregate over presentation sinks `S`/`D` and scheduler `K`.
#[derive(Debug)]
pub struct Carousel<S, D, K> {
    registry: SlideRegistry<S, D>,
    autoplay: Autoplay,
    scheduler: K,
    config: SliderConfig,
    touch_start_x: Option<f64>,
    visibility: Option<Visibility>,
}

impl<S: MarkerSink, D: MarkerSink, K: Scheduler> Carousel<S, D, K> {
    /// Build a carousel from discovered slides and dots.
    ///
    /// Returns `None` when there are no slides: the component stays inert and
    /// no timer is ever created.
    pub fn discover(
        slides: Vec<S>,
        dots: Vec<D>,
        config: SliderConfig,
        scheduler: K,
    ) -> Option<Self> {
        let config = config.sanitized();
        if slides.is_empty() {
            tracing::debug!(dots = dots.len(), "no slides found; carousel stays inert");
            return None;
        }
        if dots.len() < slides.len() {
            tracing::debug!(
                slides = slides.len(),
                dots = dots.len(),
                "fewer dots than slides; unmatched dot updates are skipped"
            );
        }
        let registry = SlideRegistry::new(slides, dots);
        tracing::debug!(
            slides = registry.len(),
            dots = registry.dots().len(),
            interval_ms = config.autoplay_interval_ms,
            "carousel discovered"
        );
        Some(Self {
            registry,
            autoplay: Autoplay::new(config.autoplay_interval()),
            scheduler,
            config,
            touch_start_x: None,
            visibility: None,
        })
    }

    /// Route one input through the interaction policy.
    pub fn dispatch(&mut self, input: SliderInput) -> SliderDispatch {
        let from_index = self.registry.current_index();
        let (navigation, command) = self.plan(input);

        if let Some(navigation) = navigation {
            match navigation {
                Navigation::To(index) => {
                    self.registry.go_to(i64::try_from(index).unwrap_or(i64::MAX));
                }
                Navigation::Prev => {
                    self.registry.prev();
                }
                Navigation::Next => {
                    self.registry.next();
                }
            }
        }

        match command {
            AutoplayCommand::Restarted => {
                self.autoplay.start(&mut self.scheduler);
            }
            AutoplayCommand::Stopped => {
                self.autoplay.stop(&mut self.scheduler);
            }
            AutoplayCommand::Unchanged => {}
        }

        let dispatch = SliderDispatch {
            input,
            from_index,
            to_index: self.registry.current_index(),
            navigated: navigation.is_some(),
            autoplay: command,
            state: self.state(),
        };
        tracing::trace!(
            input = input.kind(),
            from = dispatch.from_index,
            to = dispatch.to_index,
            autoplay = ?dispatch.autoplay,
            state = ?dispatch.state,
            "carousel dispatch"
        );
        dispatch
    }

    fn plan(&mut self, input: SliderInput) -> (Option<Navigation>, AutoplayCommand) {
        match input {
            SliderInput::DotClicked { index } => {
                (Some(Navigation::To(index)), AutoplayCommand::Restarted)
            }
            SliderInput::Key(SliderKey::ArrowLeft) => {
                (Some(Navigation::Prev), AutoplayCommand::Restarted)
            }
            SliderInput::Key(SliderKey::ArrowRight) => {
                (Some(Navigation::Next), AutoplayCommand::Restarted)
            }
            SliderInput::Key(SliderKey::Other) => (None, AutoplayCommand::Unchanged),
            SliderInput::TouchStart { x } => {
                self.touch_start_x = Some(x);
                (None, AutoplayCommand::Stopped)
            }
            SliderInput::TouchEnd { x } => {
                let navigation = self
                    .touch_start_x
                    .take()
                    .and_then(|start| self.swipe_direction(x - start));
                (navigation, AutoplayCommand::Restarted)
            }
            SliderInput::TouchCancel => {
                self.touch_start_x = None;
                (None, AutoplayCommand::Restarted)
            }
            SliderInput::Visibility(visibility) => {
                self.visibility = Some(visibility);
                match visibility {
                    Visibility::Entered => (None, AutoplayCommand::Restarted),
                    Visibility::Exited => (None, AutoplayCommand::Stopped),
                }
            }
        }
    }

    /// Rightward swipes go back, leftward swipes go forward.
    fn swipe_direction(&self, dx: f64) -> Option<Navigation> {
        if !dx.is_finite() || dx == 0.0 || dx.abs() < self.config.swipe_threshold_px {
            return None;
        }
        Some(if dx > 0.0 {
            Navigation::Prev
        } else {
            Navigation::Next
        })
    }

    /// Deliver a scheduler tick. Returns `true` when it advanced the carousel.
    ///
    /// Ticks from timers this carousel no longer owns are dropped.
    pub fn tick(&mut self, id: TimerId) -> bool {
        if !self.autoplay.owns(id) {
            tracing::trace!(timer = id.get(), "stale autoplay tick ignored");
            return false;
        }
        let index = self.registry.next();
        tracing::trace!(timer = id.get(), index, "autoplay advanced");
        true
    }

    /// Stop autoplay and forget any touch in progress.
    pub fn shutdown(&mut self) {
        self.autoplay.stop(&mut self.scheduler);
        self.touch_start_x = None;
        tracing::debug!("carousel shut down");
    }

    /// Navigate without touching the timer.
    pub fn go_to(&mut self, target: i64) -> usize {
        self.registry.go_to(target)
    }
}

impl<S, D, K> Carousel<S, D, K> {
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.registry.current_index()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Always `false` for a discovered carousel; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    #[must_use]
    pub const fn state(&self) -> SliderState {
        if self.autoplay.is_running() {
            SliderState::Autoplaying
        } else {
            SliderState::Idle
        }
    }

    #[must_use]
    pub const fn is_autoplaying(&self) -> bool {
        self.autoplay.is_running()
    }

    /// Id of the live autoplay timer, if any.
    #[must_use]
    pub fn autoplay_timer(&self) -> Option<TimerId> {
        self.autoplay.timer_id()
    }

    /// Last visibility signal received, if any.
    #[must_use]
    pub const fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    /// Whether a touch start is waiting for its end.
    #[must_use]
    pub const fn touch_in_progress(&self) -> bool {
        self.touch_start_x.is_some()
    }

    #[must_use]
    pub const fn registry(&self) -> &SlideRegistry<S, D> {
        &self.registry
    }

    #[must_use]
    pub const fn config(&self) -> &SliderConfig {
        &self.config
    }

    #[must_use]
    pub const fn scheduler(&self) -> &K {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }
}

impl<S: MarkerSink, D: MarkerSink> Carousel<S, D, ManualScheduler> {
    /// Advance the manual clock by `dt`, delivering every due tick in order.
    ///
    /// Returns the number of ticks that advanced the carousel. Runs one
    /// dispatch per due tick, so `dt` should span a bounded number of
    /// autoplay intervals.
    pub fn advance(&mut self, dt: Duration) -> usize {
        let target = self.scheduler.now().saturating_add(dt);
        let mut advanced = 0;
        while let Some(id) = self.scheduler.pop_due(target) {
            if self.tick(id) {
                advanced += 1;
            }
        }
        self.scheduler.advance_to(target);
        advanced
    }

    /// Current manual clock time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.scheduler.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::RecordedElement;

    use pretty_assertions::assert_eq;

    type TestCarousel = Carousel<RecordedElement, RecordedElement, ManualScheduler>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn carousel(n: usize) -> TestCarousel {
        Carousel::discover(
            RecordedElement::many(n),
            RecordedElement::many(n),
            SliderConfig::default(),
            ManualScheduler::new(),
        )
        .expect("non-empty carousel")
    }

    fn visible(c: &mut TestCarousel) {
        c.dispatch(SliderInput::Visibility(Visibility::Entered));
    }

    #[test]
    fn no_slides_means_no_carousel() {
        let c: Option<TestCarousel> = Carousel::discover(
            Vec::new(),
            RecordedElement::many(3),
            SliderConfig::default(),
            ManualScheduler::new(),
        );
        assert!(c.is_none());
    }

    #[test]
    fn starts_idle_until_first_visible() {
        let mut c = carousel(3);
        assert_eq!(c.state(), SliderState::Idle);
        assert_eq!(c.advance(ms(10_000)), 0);
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.scheduler().pending(), 0);

        visible(&mut c);
        assert_eq!(c.state(), SliderState::Autoplaying);
        assert_eq!(c.advance(ms(2000)), 1);
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn dot_click_navigates_then_restarts() {
        let mut c = carousel(4);
        visible(&mut c);
        c.advance(ms(700));
        let d = c.dispatch(SliderInput::DotClicked { index: 3 });
        assert_eq!(
            d,
            SliderDispatch {
                input: SliderInput::DotClicked { index: 3 },
                from_index: 0,
                to_index: 3,
                navigated: true,
                autoplay: AutoplayCommand::Restarted,
                state: SliderState::Autoplaying,
            }
        );
        assert_eq!(c.scheduler().next_deadline(), Some(ms(2700)));
        assert_eq!(c.scheduler().pending(), 1);
    }

    #[test]
    fn arrows_navigate_and_other_keys_are_ignored() {
        let mut c = carousel(3);
        let d = c.dispatch(SliderInput::Key(SliderKey::ArrowLeft));
        assert_eq!(d.to_index, 2);
        assert_eq!(d.state, SliderState::Autoplaying);
        let d = c.dispatch(SliderInput::Key(SliderKey::ArrowRight));
        assert_eq!(d.to_index, 0);

        c.dispatch(SliderInput::Visibility(Visibility::Exited));
        let d = c.dispatch(SliderInput::Key(SliderKey::Other));
        assert_eq!(d.autoplay, AutoplayCommand::Unchanged);
        assert!(!d.navigated);
        assert_eq!(d.state, SliderState::Idle);
    }

    #[test]
    fn touch_start_stops_autoplay() {
        let mut c = carousel(3);
        visible(&mut c);
        let d = c.dispatch(SliderInput::TouchStart { x: 10.0 });
        assert_eq!(d.state, SliderState::Idle);
        assert!(c.touch_in_progress());
        assert_eq!(c.advance(ms(10_000)), 0);
    }

    #[test]
    fn rightward_swipe_goes_back() {
        let mut c = carousel(4);
        c.dispatch(SliderInput::TouchStart { x: 100.0 });
        let d = c.dispatch(SliderInput::TouchEnd { x: 150.0 });
        assert_eq!(d.to_index, 3);
        assert_eq!(d.state, SliderState::Autoplaying);
        assert!(!c.touch_in_progress());
    }

    #[test]
    fn swipe_exactly_at_threshold_counts() {
        let mut c = carousel(4);
        c.dispatch(SliderInput::TouchStart { x: 300.0 });
        let d = c.dispatch(SliderInput::TouchEnd { x: 250.0 });
        assert_eq!(d.to_index, 1);
    }

    #[test]
    fn advance_to_end_of_clock_range_terminates() {
        let mut c = carousel(3);
        c.scheduler_mut().advance_to(Duration::MAX - ms(3000));
        visible(&mut c);
        assert_eq!(c.advance(Duration::MAX), 1);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.now(), Duration::MAX);
    }

    #[test]
    fn unusable_swipe_threshold_falls_back_to_default() {
        for threshold in [f64::NAN, -5.0] {
            let config = SliderConfig {
                swipe_threshold_px: threshold,
                ..SliderConfig::default()
            };
            let mut c: TestCarousel = Carousel::discover(
                RecordedElement::many(4),
                RecordedElement::many(4),
                config,
                ManualScheduler::new(),
            )
            .expect("non-empty carousel");
            assert_eq!(c.config().swipe_threshold_px, crate::config::DEFAULT_SWIPE_THRESHOLD_PX);

            c.dispatch(SliderInput::TouchStart { x: 300.0 });
            let d = c.dispatch(SliderInput::TouchEnd { x: 299.0 });
            assert!(!d.navigated);
            assert_eq!(c.current_index(), 0);
        }
    }

    #[test]
    fn touch_end_without_start_only_restarts() {
        let mut c = carousel(4);
        let d = c.dispatch(SliderInput::TouchEnd { x: 0.0 });
        assert!(!d.navigated);
        assert_eq!(d.to_index, 0);
        assert_eq!(d.autoplay, AutoplayCommand::Restarted);
    }

    #[test]
    fn touch_cancel_resumes_autoplay() {
        let mut c = carousel(3);
        visible(&mut c);
        c.dispatch(SliderInput::TouchStart { x: 10.0 });
        let d = c.dispatch(SliderInput::TouchCancel);
        assert_eq!(d.state, SliderState::Autoplaying);
        assert!(!c.touch_in_progress());
        // Stale start must not turn a later bare end into a swipe.
        let d = c.dispatch(SliderInput::TouchEnd { x: 500.0 });
        assert!(!d.navigated);
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut c = carousel(3);
        visible(&mut c);
        let old = c.autoplay_timer().unwrap();
        c.dispatch(SliderInput::Key(SliderKey::ArrowRight));
        assert!(!c.tick(old));
        assert_eq!(c.current_index(), 1);
        let live = c.autoplay_timer().unwrap();
        assert!(c.tick(live));
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn shutdown_releases_the_timer() {
        let mut c = carousel(3);
        visible(&mut c);
        c.shutdown();
        assert_eq!(c.state(), SliderState::Idle);
        assert_eq!(c.scheduler().pending(), 0);
        c.shutdown();
        assert_eq!(c.scheduler().pending(), 0);
    }

    #[test]
    fn custom_threshold_and_interval() {
        let config = SliderConfig {
            autoplay_interval_ms: 500,
            swipe_threshold_px: 10.0,
            ..SliderConfig::default()
        };
        let mut c: TestCarousel = Carousel::discover(
            RecordedElement::many(3),
            Vec::new(),
            config,
            ManualScheduler::new(),
        )
        .unwrap();
        c.dispatch(SliderInput::TouchStart { x: 50.0 });
        assert_eq!(c.dispatch(SliderInput::TouchEnd { x: 38.0 }).to_index, 1);
        assert_eq!(c.advance(ms(1000)), 2);
        assert_eq!(c.current_index(), 0);
    }
}
