#![forbid(unsafe_code)]

//! Carousel input events and the JSON schema the web host encodes them in.
//!
//! The host only forwards what the coordinator consumes: which dot was
//! clicked, the DOM `key` of a key press, the horizontal screen coordinate of
//! a touch, and whether the root crossed the visibility threshold.
//!
//! # Encoded schema
//!
//! ```json
//! {"kind":"dot","index":2}
//! {"kind":"key","key":"ArrowLeft"}
//! {"kind":"touch","phase":"start","x":300}
//! {"kind":"visibility","ratio":0.3}
//! {"kind":"visibility","visible":false}
//! ```

use serde::Deserialize;

use crate::config::DEFAULT_VISIBILITY_THRESHOLD;

/// Keys the carousel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderKey {
    ArrowLeft,
    ArrowRight,
    /// Any other key; ignored by the coordinator.
    Other,
}

impl SliderKey {
    /// Normalize a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            _ => Self::Other,
        }
    }
}

/// Discrete viewport visibility signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible ratio is at or above the threshold.
    Entered,
    /// Visible ratio dropped below the threshold.
    Exited,
}

impl Visibility {
    /// Classify an intersection ratio against `threshold`.
    ///
    /// Non-finite ratios count as not visible.
    #[must_use]
    pub fn from_ratio(ratio: f64, threshold: f64) -> Self {
        if ratio.is_finite() && ratio >= threshold {
            Self::Entered
        } else {
            Self::Exited
        }
    }

    #[must_use]
    pub const fn from_visible(visible: bool) -> Self {
        if visible { Self::Entered } else { Self::Exited }
    }

    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Entered)
    }
}

/// One input delivered to the carousel coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderInput {
    /// The dot at `index` was clicked.
    DotClicked { index: usize },
    /// A key was pressed while the carousel had focus.
    Key(SliderKey),
    /// A touch began at horizontal screen coordinate `x`.
    TouchStart { x: f64 },
    /// A touch ended at horizontal screen coordinate `x`.
    TouchEnd { x: f64 },
    /// The browser cancelled the touch sequence.
    TouchCancel,
    /// The root crossed the visibility threshold.
    Visibility(Visibility),
}

impl SliderInput {
    /// Short stable label for logs and replay reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DotClicked { .. } => "dot",
            Self::Key(_) => "key",
            Self::TouchStart { .. } => "touch_start",
            Self::TouchEnd { .. } => "touch_end",
            Self::TouchCancel => "touch_cancel",
            Self::Visibility(_) => "visibility",
        }
    }
}

/// Errors from parsing encoded input JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown touch phase value.
    UnknownPhase(String),
    /// Unknown event kind.
    UnknownKind(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownPhase(phase) => write!(f, "unknown phase: {phase}"),
            Self::UnknownKind(kind) => write!(f, "unknown kind: {kind}"),
        }
    }
}

impl std::error::Error for InputParseError {}

#[derive(Debug, Deserialize)]
struct RawInput {
    kind: String,
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    ratio: Option<f64>,
    #[serde(default)]
    visible: Option<bool>,
}

/// Parse one encoded input event.
///
/// Visibility ratios are classified against the default threshold; use
/// [`parse_encoded_input_with_threshold`] for a configured carousel.
pub fn parse_encoded_input(json: &str) -> Result<SliderInput, InputParseError> {
    parse_encoded_input_with_threshold(json, DEFAULT_VISIBILITY_THRESHOLD)
}

/// Parse one encoded input event, classifying visibility ratios against
/// `threshold`.
pub fn parse_encoded_input_with_threshold(
    json: &str,
    threshold: f64,
) -> Result<SliderInput, InputParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    from_raw(raw, threshold)
}

/// Parse an already-decoded JSON value (used by session scripts).
pub(crate) fn parse_input_value(
    value: serde_json::Value,
    threshold: f64,
) -> Result<SliderInput, InputParseError> {
    let raw: RawInput =
        serde_json::from_value(value).map_err(|e| InputParseError::Json(e.to_string()))?;
    from_raw(raw, threshold)
}

fn from_raw(raw: RawInput, threshold: f64) -> Result<SliderInput, InputParseError> {
    match raw.kind.as_str() {
        "dot" => {
            let index = raw.index.ok_or(InputParseError::MissingField("index"))?;
            Ok(SliderInput::DotClicked { index })
        }
        "key" => {
            let key = raw.key.ok_or(InputParseError::MissingField("key"))?;
            Ok(SliderInput::Key(SliderKey::from_dom_key(&key)))
        }
        "touch" => parse_touch(&raw),
        "visibility" => parse_visibility(&raw, threshold),
        other => Err(InputParseError::UnknownKind(other.to_owned())),
    }
}

fn parse_touch(raw: &RawInput) -> Result<SliderInput, InputParseError> {
    let phase = raw
        .phase
        .as_deref()
        .ok_or(InputParseError::MissingField("phase"))?;
    match phase {
        "cancel" => Ok(SliderInput::TouchCancel),
        "start" | "end" => {
            let x = raw.x.ok_or(InputParseError::MissingField("x"))?;
            if phase == "start" {
                Ok(SliderInput::TouchStart { x })
            } else {
                Ok(SliderInput::TouchEnd { x })
            }
        }
        other => Err(InputParseError::UnknownPhase(other.to_owned())),
    }
}

fn parse_visibility(raw: &RawInput, threshold: f64) -> Result<SliderInput, InputParseError> {
    if let Some(visible) = raw.visible {
        return Ok(SliderInput::Visibility(Visibility::from_visible(visible)));
    }
    let ratio = raw.ratio.ok_or(InputParseError::MissingField("ratio"))?;
    Ok(SliderInput::Visibility(Visibility::from_ratio(ratio, threshold)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn dom_keys_normalize() {
        assert_eq!(SliderKey::from_dom_key("ArrowLeft"), SliderKey::ArrowLeft);
        assert_eq!(SliderKey::from_dom_key("Right"), SliderKey::ArrowRight);
        assert_eq!(SliderKey::from_dom_key("Enter"), SliderKey::Other);
    }

    #[test]
    fn ratio_at_threshold_is_visible() {
        assert_eq!(Visibility::from_ratio(0.05, 0.05), Visibility::Entered);
        assert_eq!(Visibility::from_ratio(0.049, 0.05), Visibility::Exited);
        assert_eq!(Visibility::from_ratio(0.0, 0.05), Visibility::Exited);
        assert_eq!(Visibility::from_ratio(f64::NAN, 0.05), Visibility::Exited);
    }

    #[test]
    fn parses_every_kind() {
        assert_eq!(
            parse_encoded_input(r#"{"kind":"dot","index":2}"#).unwrap(),
            SliderInput::DotClicked { index: 2 }
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"key","key":"ArrowRight"}"#).unwrap(),
            SliderInput::Key(SliderKey::ArrowRight)
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"touch","phase":"start","x":300}"#).unwrap(),
            SliderInput::TouchStart { x: 300.0 }
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"touch","phase":"end","x":200.5}"#).unwrap(),
            SliderInput::TouchEnd { x: 200.5 }
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"touch","phase":"cancel"}"#).unwrap(),
            SliderInput::TouchCancel
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"visibility","ratio":0.3}"#).unwrap(),
            SliderInput::Visibility(Visibility::Entered)
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"visibility","visible":false}"#).unwrap(),
            SliderInput::Visibility(Visibility::Exited)
        );
    }

    #[test]
    fn configured_threshold_is_respected() {
        let input =
            parse_encoded_input_with_threshold(r#"{"kind":"visibility","ratio":0.3}"#, 0.5)
                .unwrap();
        assert_eq!(input, SliderInput::Visibility(Visibility::Exited));
    }

    #[test]
    fn missing_fields_are_reported() {
        assert_eq!(
            parse_encoded_input(r#"{"kind":"dot"}"#),
            Err(InputParseError::MissingField("index"))
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"touch","phase":"end"}"#),
            Err(InputParseError::MissingField("x"))
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"visibility"}"#),
            Err(InputParseError::MissingField("ratio"))
        );
    }

    #[test]
    fn unknown_values_are_errors() {
        assert_eq!(
            parse_encoded_input(r#"{"kind":"touch","phase":"hover","x":1}"#),
            Err(InputParseError::UnknownPhase("hover".into()))
        );
        assert_eq!(
            parse_encoded_input(r#"{"kind":"wheel"}"#),
            Err(InputParseError::UnknownKind("wheel".into()))
        );
        assert!(matches!(
            parse_encoded_input("not json"),
            Err(InputParseError::Json(_))
        ));
    }
}
