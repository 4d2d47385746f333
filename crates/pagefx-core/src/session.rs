#![forbid(unsafe_code)]

//! Deterministic session scripts and replay for the carousel.
//!
//! A script is JSONL: one timestamped encoded input per line.
//!
//! ```text
//! {"at_ms":0,"input":{"kind":"visibility","ratio":1.0}}
//! {"at_ms":500,"input":{"kind":"dot","index":2}}
//! ```
//!
//! [`replay`] runs the script through a fresh carousel built from in-memory
//! elements and a [`ManualScheduler`], delivering autoplay ticks at their
//! exact deadlines between inputs. The resulting [`ReplayReport`] lists every
//! index change with its timestamp and cause, which makes timing scenarios
//! ("the next tick lands 2000 ms after the click") directly assertable.
//!
//! Blank lines and lines starting with `#` are skipped. Timestamps must not
//! decrease.

use core::time::Duration;

use serde::Deserialize;

use crate::carousel::{Carousel, SliderState};
use crate::config::SliderConfig;
use crate::input::{InputParseError, SliderInput, parse_input_value};
use crate::marker::RecordedElement;
use crate::scheduler::ManualScheduler;

/// One timestamped input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStep {
    pub at: Duration,
    pub input: SliderInput,
}

/// Ordered list of timestamped inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionScript {
    pub steps: Vec<SessionStep>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    at_ms: u64,
    input: serde_json::Value,
}

impl SessionScript {
    #[must_use]
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step. Callers keep timestamps non-decreasing.
    #[must_use]
    pub fn then(mut self, at_ms: u64, input: SliderInput) -> Self {
        self.steps.push(SessionStep {
            at: Duration::from_millis(at_ms),
            input,
        });
        self
    }

    /// Parse a JSONL script, classifying visibility ratios against `threshold`.
    pub fn parse_jsonl(text: &str, threshold: f64) -> Result<Self, ReplayError> {
        let mut steps = Vec::new();
        let mut last = Duration::ZERO;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let raw: RawStep = serde_json::from_str(trimmed).map_err(|e| ReplayError::Parse {
                line: line_no,
                error: InputParseError::Json(e.to_string()),
            })?;
            let at = Duration::from_millis(raw.at_ms);
            if at < last {
                return Err(ReplayError::NonMonotonicTime { line: line_no });
            }
            last = at;
            let input = parse_input_value(raw.input, threshold).map_err(|error| {
                ReplayError::Parse {
                    line: line_no,
                    error,
                }
            })?;
            steps.push(SessionStep { at, input });
        }
        Ok(Self { steps })
    }
}

/// What moved the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    /// An autoplay tick.
    Tick,
    /// An input of the given kind (see [`SliderInput::kind`]).
    Input(&'static str),
}

/// One observed index change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexChange {
    pub at: Duration,
    pub from: usize,
    pub to: usize,
    pub cause: ChangeCause,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub changes: Vec<IndexChange>,
    pub final_index: usize,
    pub final_state: SliderState,
    pub ended_at: Duration,
    /// Autoplay ticks that advanced the carousel.
    pub ticks: usize,
}

impl ReplayReport {
    /// Timestamps of every tick-driven change.
    #[must_use]
    pub fn tick_times(&self) -> Vec<Duration> {
        self.changes
            .iter()
            .filter(|c| c.cause == ChangeCause::Tick)
            .map(|c| c.at)
            .collect()
    }
}

/// Errors from parsing a session script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// A line failed to parse.
    Parse { line: usize, error: InputParseError },
    /// A line's timestamp is earlier than the previous line's.
    NonMonotonicTime { line: usize },
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse { line, error } => write!(f, "line {line}: {error}"),
            Self::NonMonotonicTime { line } => {
                write!(f, "line {line}: timestamp earlier than previous line")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { error, .. } => Some(error),
            Self::NonMonotonicTime { .. } => None,
        }
    }
}

type ReplayCarousel = Carousel<RecordedElement, RecordedElement, ManualScheduler>;

fn drain_ticks(carousel: &mut ReplayCarousel, limit: Duration, report: &mut ReplayReport) {
    while let Some(id) = carousel.scheduler_mut().pop_due(limit) {
        let from = carousel.current_index();
        if carousel.tick(id) {
            report.ticks += 1;
            let to = carousel.current_index();
            if from != to {
                report.changes.push(IndexChange {
                    at: carousel.now(),
                    from,
                    to,
                    cause: ChangeCause::Tick,
                });
            }
        }
    }
    carousel.scheduler_mut().advance_to(limit);
}

/// Replay `script` against a fresh carousel of `slides` slides (one dot per
/// slide), then keep the clock running until `until` if it is later than the
/// last step.
///
/// Returns `None` when `slides == 0`: an empty carousel is inert. Every
/// autoplay tick up to the last step or `until` is replayed one by one.
#[must_use]
pub fn replay(
    script: &SessionScript,
    slides: usize,
    config: SliderConfig,
    until: Option<Duration>,
) -> Option<ReplayReport> {
    let mut carousel: ReplayCarousel = Carousel::discover(
        RecordedElement::many(slides),
        RecordedElement::many(slides),
        config,
        ManualScheduler::new(),
    )?;
    let mut report = ReplayReport {
        changes: Vec::new(),
        final_index: 0,
        final_state: SliderState::Idle,
        ended_at: Duration::ZERO,
        ticks: 0,
    };

    for step in &script.steps {
        drain_ticks(&mut carousel, step.at, &mut report);
        let dispatch = carousel.dispatch(step.input);
        if dispatch.from_index != dispatch.to_index {
            report.changes.push(IndexChange {
                at: carousel.now(),
                from: dispatch.from_index,
                to: dispatch.to_index,
                cause: ChangeCause::Input(step.input.kind()),
            });
        }
    }
    if let Some(until) = until {
        drain_ticks(&mut carousel, until, &mut report);
    }

    report.final_index = carousel.current_index();
    report.final_state = carousel.state();
    report.ended_at = carousel.now();
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{SliderKey, Visibility};

    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn parses_jsonl_with_comments() {
        let text = r#"
# enter the viewport
{"at_ms":0,"input":{"kind":"visibility","ratio":1.0}}

{"at_ms":500,"input":{"kind":"key","key":"ArrowRight"}}
"#;
        let script = SessionScript::parse_jsonl(text, 0.05).unwrap();
        assert_eq!(
            script,
            SessionScript::new()
                .then(0, SliderInput::Visibility(Visibility::Entered))
                .then(500, SliderInput::Key(SliderKey::ArrowRight))
        );
    }

    #[test]
    fn rejects_time_going_backwards() {
        let text = "{\"at_ms\":10,\"input\":{\"kind\":\"touch\",\"phase\":\"cancel\"}}\n\
                    {\"at_ms\":5,\"input\":{\"kind\":\"touch\",\"phase\":\"cancel\"}}";
        assert_eq!(
            SessionScript::parse_jsonl(text, 0.05),
            Err(ReplayError::NonMonotonicTime { line: 2 })
        );
    }

    #[test]
    fn reports_line_of_bad_input() {
        let text = r#"{"at_ms":0,"input":{"kind":"dot"}}"#;
        let err = SessionScript::parse_jsonl(text, 0.05).unwrap_err();
        assert_eq!(
            err,
            ReplayError::Parse {
                line: 1,
                error: InputParseError::MissingField("index"),
            }
        );
        assert_eq!(err.to_string(), "line 1: missing required field: index");
    }

    #[test]
    fn replay_records_ticks_and_inputs() {
        let script = SessionScript::new()
            .then(0, SliderInput::Visibility(Visibility::Entered))
            .then(3000, SliderInput::DotClicked { index: 0 });
        let report = replay(&script, 3, SliderConfig::default(), Some(ms(5000))).unwrap();
        assert_eq!(
            report.changes,
            vec![
                IndexChange {
                    at: ms(2000),
                    from: 0,
                    to: 1,
                    cause: ChangeCause::Tick,
                },
                IndexChange {
                    at: ms(3000),
                    from: 1,
                    to: 0,
                    cause: ChangeCause::Input("dot"),
                },
                IndexChange {
                    at: ms(5000),
                    from: 0,
                    to: 1,
                    cause: ChangeCause::Tick,
                },
            ]
        );
        assert_eq!(report.ticks, 2);
        assert_eq!(report.final_state, SliderState::Autoplaying);
        assert_eq!(report.ended_at, ms(5000));
    }

    #[test]
    fn replay_of_empty_carousel_is_none() {
        assert!(replay(&SessionScript::new(), 0, SliderConfig::default(), None).is_none());
    }
}
