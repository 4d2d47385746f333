#![forbid(unsafe_code)]

//! Configuration for the carousel and the page collaborators.
//!
//! Every field has a default equal to the constant the page shipped with, so
//! `SliderConfig::default()` behaves exactly like an unconfigured page.
//!
//! # Loading
//!
//! ```json
//! { "autoplay_interval_ms": 3000, "swipe_threshold_px": 40 }
//! ```
//!
//! ```rust,ignore
//! let config = SliderConfig::load_json_validated(json)?;
//! ```
//!
//! Missing fields keep their defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Default dwell interval between automatic advances.
pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 2000;
/// Default minimum horizontal displacement for a swipe.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 50.0;
/// Default visible-area ratio at which the carousel counts as on screen.
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.05;

/// Carousel tuning and markup identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    /// Dwell interval between automatic advances, in milliseconds.
    pub autoplay_interval_ms: u64,
    /// Minimum horizontal touch displacement that counts as a swipe.
    pub swipe_threshold_px: f64,
    /// Visible-area ratio (0, 1] that gates autoplay.
    pub visibility_threshold: f64,
    /// Selectors and marker names used by the web host.
    pub markup: SliderMarkup,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            markup: SliderMarkup::default(),
        }
    }
}

/// Structural identity of the carousel markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderMarkup {
    pub slide_selector: String,
    pub dot_selector: String,
    pub slide_active_class: String,
    pub dot_active_class: String,
    pub selected_attribute: String,
}

impl Default for SliderMarkup {
    fn default() -> Self {
        Self {
            slide_selector: ".phone-slider__slide".into(),
            dot_selector: ".phone-slider__dot".into(),
            slide_active_class: "phone-slider__slide--active".into(),
            dot_active_class: "phone-slider__dot--active".into(),
            selected_attribute: "aria-selected".into(),
        }
    }
}

impl SliderConfig {
    /// Load from a JSON string. Does not validate.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from JSON and reject configs that fail [`Self::validate`].
    pub fn load_json_validated(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_json_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.autoplay_interval_ms == 0 {
            errors.push("autoplay_interval_ms must be > 0".into());
        }
        if !self.swipe_threshold_px.is_finite() || self.swipe_threshold_px < 0.0 {
            errors.push(format!(
                "swipe_threshold_px must be finite and >= 0, got {}",
                self.swipe_threshold_px
            ));
        }
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            errors.push(format!(
                "visibility_threshold must be in (0, 1], got {}",
                self.visibility_threshold
            ));
        }

        let m = &self.markup;
        for (name, value) in [
            ("markup.slide_selector", &m.slide_selector),
            ("markup.dot_selector", &m.dot_selector),
            ("markup.slide_active_class", &m.slide_active_class),
            ("markup.dot_active_class", &m.dot_active_class),
            ("markup.selected_attribute", &m.selected_attribute),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }

        errors
    }

    /// This config if it validates, otherwise the defaults.
    ///
    /// Components built from an unchecked config go through here so a NaN
    /// or negative threshold can never turn a tap into a swipe.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let errors = self.validate();
        if errors.is_empty() {
            self
        } else {
            tracing::warn!(?errors, "invalid slider config; using defaults");
            Self::default()
        }
    }

    /// Dwell interval as a [`Duration`].
    #[must_use]
    pub const fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }
}

/// Tuning for the one-shot page behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Scroll offset past which the header gets its scrolled class.
    pub header_scroll_threshold_px: f64,
    /// Gap left above an anchor target after header compensation.
    pub anchor_gap_px: f64,
    /// How long copy feedback stays visible.
    pub copy_feedback_ms: u64,
    /// Label shown while copy feedback is visible.
    pub copy_feedback_label: String,
    /// Media query at which the navigation overlay force-closes.
    pub desktop_media_query: String,
    /// Selector matching every carousel root on the page.
    pub slider_root_selector: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_scroll_threshold_px: 100.0,
            anchor_gap_px: 20.0,
            copy_feedback_ms: 2000,
            copy_feedback_label: "Copied!".into(),
            desktop_media_query: "(min-width: 1024px)".into(),
            slider_root_selector: ".phone-slider".into(),
        }
    }
}

impl PageConfig {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from JSON and reject configs that fail [`Self::validate`].
    pub fn load_json_validated(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_json_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for (name, value) in [
            ("header_scroll_threshold_px", self.header_scroll_threshold_px),
            ("anchor_gap_px", self.anchor_gap_px),
        ] {
            if !value.is_finite() {
                errors.push(format!("{name} must be finite, got {value}"));
            }
        }
        for (name, value) in [
            ("desktop_media_query", &self.desktop_media_query),
            ("slider_root_selector", &self.slider_root_selector),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{name} must not be empty"));
            }
        }
        errors
    }

    #[must_use]
    pub const fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_shipped_constants() {
        let c = SliderConfig::default();
        assert_eq!(c.autoplay_interval(), Duration::from_millis(2000));
        assert_eq!(c.swipe_threshold_px, 50.0);
        assert_eq!(c.visibility_threshold, 0.05);
        assert!(c.validate().is_empty());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = SliderConfig::from_json_str(r#"{"autoplay_interval_ms":3500}"#).unwrap();
        assert_eq!(c.autoplay_interval_ms, 3500);
        assert_eq!(c.swipe_threshold_px, 50.0);
        assert_eq!(c.markup, SliderMarkup::default());
    }

    #[test]
    fn nested_markup_overrides_merge_with_defaults() {
        let c = SliderConfig::from_json_str(r#"{"markup":{"dot_selector":".hero__dot"}}"#).unwrap();
        assert_eq!(c.markup.dot_selector, ".hero__dot");
        assert_eq!(c.markup.slide_selector, ".phone-slider__slide");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = SliderConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("JSON parse error"));
    }

    #[test]
    fn validate_catches_zero_interval() {
        let c = SliderConfig {
            autoplay_interval_ms: 0,
            ..SliderConfig::default()
        };
        let errors = c.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("autoplay_interval_ms"));
    }

    #[test]
    fn validate_catches_bad_thresholds() {
        let c = SliderConfig {
            swipe_threshold_px: f64::NAN,
            visibility_threshold: 0.0,
            ..SliderConfig::default()
        };
        let errors = c.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validate_catches_empty_selector() {
        let mut c = SliderConfig::default();
        c.markup.dot_selector = "  ".into();
        assert_eq!(c.validate(), vec!["markup.dot_selector must not be empty".to_string()]);
    }

    #[test]
    fn load_json_validated_rejects_invalid() {
        let err = SliderConfig::load_json_validated(r#"{"visibility_threshold":2.0}"#).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn page_config_defaults() {
        let p = PageConfig::default();
        assert_eq!(p.copy_feedback(), Duration::from_millis(2000));
        assert_eq!(p.header_scroll_threshold_px, 100.0);
        let p = PageConfig::from_json_str(r#"{"copy_feedback_label":"Done"}"#).unwrap();
        assert_eq!(p.copy_feedback_label, "Done");
        assert_eq!(p.anchor_gap_px, 20.0);
        assert_eq!(p.slider_root_selector, ".phone-slider");
        assert!(p.validate().is_empty());
    }

    #[test]
    fn page_config_rejects_blank_root_selector() {
        let err = PageConfig::load_json_validated(r#"{"slider_root_selector":" "}"#).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec!["slider_root_selector must not be empty".to_string()]);
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn sanitized_keeps_valid_and_replaces_invalid() {
        let tuned = SliderConfig {
            swipe_threshold_px: 30.0,
            ..SliderConfig::default()
        };
        assert_eq!(tuned.clone().sanitized(), tuned);

        for bad in [f64::NAN, -1.0, f64::INFINITY] {
            let c = SliderConfig {
                swipe_threshold_px: bad,
                ..SliderConfig::default()
            };
            assert_eq!(c.sanitized(), SliderConfig::default());
        }
    }
}
