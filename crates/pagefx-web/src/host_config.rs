#![forbid(unsafe_code)]

//! Configuration read from markup attributes.
//!
//! A carousel root may carry `data-slider-config='{"autoplay_interval_ms":3000}'`
//! and the document element may carry `data-page-config`. A missing or blank
//! attribute means defaults. An invalid one is logged and also means
//! defaults: a typo in markup must never disable the component.

use pagefx_core::{PageConfig, SliderConfig};

/// Attribute on a carousel root holding its JSON config.
pub const SLIDER_CONFIG_ATTRIBUTE: &str = "data-slider-config";
/// Attribute on the document element holding the page JSON config.
pub const PAGE_CONFIG_ATTRIBUTE: &str = "data-page-config";

/// Resolve a carousel config from the raw attribute value.
#[must_use]
pub fn slider_config_from_attribute(raw: Option<&str>) -> SliderConfig {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return SliderConfig::default();
    };
    match SliderConfig::load_json_validated(raw) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(
                attribute = SLIDER_CONFIG_ATTRIBUTE,
                %error,
                "invalid slider config; using defaults"
            );
            SliderConfig::default()
        }
    }
}

/// Resolve the page config from the raw attribute value.
#[must_use]
pub fn page_config_from_attribute(raw: Option<&str>) -> PageConfig {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return PageConfig::default();
    };
    match PageConfig::load_json_validated(raw) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(
                attribute = PAGE_CONFIG_ATTRIBUTE,
                %error,
                "invalid page config; using defaults"
            );
            PageConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn missing_or_blank_attribute_uses_defaults() {
        assert_eq!(slider_config_from_attribute(None), SliderConfig::default());
        assert_eq!(slider_config_from_attribute(Some("  ")), SliderConfig::default());
        assert_eq!(page_config_from_attribute(None), PageConfig::default());
    }

    #[test]
    fn valid_attribute_overrides_fields() {
        let config = slider_config_from_attribute(Some(r#"{"autoplay_interval_ms":3000}"#));
        assert_eq!(config.autoplay_interval_ms, 3000);
        assert_eq!(config.swipe_threshold_px, 50.0);

        let page = page_config_from_attribute(Some(r#"{"copy_feedback_label":"Done!"}"#));
        assert_eq!(page.copy_feedback_label, "Done!");
    }

    #[test]
    fn invalid_attribute_falls_back() {
        assert_eq!(
            slider_config_from_attribute(Some("{oops")),
            SliderConfig::default()
        );
        assert_eq!(
            slider_config_from_attribute(Some(r#"{"autoplay_interval_ms":0}"#)),
            SliderConfig::default()
        );
        assert_eq!(page_config_from_attribute(Some("[]")), PageConfig::default());
    }

    #[test]
    fn page_attribute_sets_slider_root_selector() {
        let page = page_config_from_attribute(Some(r##"{"slider_root_selector":"#hero-phone"}"##));
        assert_eq!(page.slider_root_selector, "#hero-phone");
        assert_eq!(page.copy_feedback_label, "Copied!");

        let blank = page_config_from_attribute(Some(r#"{"slider_root_selector":""}"#));
        assert_eq!(blank.slider_root_selector, ".phone-slider");
    }
}
