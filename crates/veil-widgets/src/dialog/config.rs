#![forbid(unsafe_code)]

//! Dialog configuration: partial [`DialogOptions`] and resolved [`DialogConfig`].
//!
//! Callers describe only what they want to change; everything left unset
//! falls back to the documented defaults when the options are resolved.
//!
//! | Option | Default |
//! |--------|---------|
//! | `fadeDurationMs` | `300` |
//! | `fadeDelayFactor` | `0.5` |
//! | `escapeCloses` | `true` |
//! | `clickOutsideCloses` | `true` |
//! | `showCloseButton` | `true` |
//! | `closeButtonLabel` | `"×"` |
//! | `useSlideTransform` | `true` |
//! | `useRoundedCorners` | `true` |
//! | `overlayColor` | `rgba(0, 0, 0, 0.4)` |
//! | `backgroundColor` | `#ffffff` |
//! | `textColor` | `#2a2a2a` |
//! | `cornerRadius` | `12px` |
//! | `restoreFocus` | `true` |
//!
//! # Policy as data
//!
//! With the `policy-config` feature, options load from TOML or JSON text
//! using the camelCase names above. Unknown keys are rejected.
//!
//! ```toml
//! fadeDurationMs = 150
//! escapeCloses = false
//! overlayColor = "rgba(0, 0, 0, 0.6)"
//! cornerRadius = "4px"
//! ```

use std::fmt;
use std::time::Duration;

use veil_style::{Color, Length};

pub const DEFAULT_FADE_DURATION_MS: u64 = 300;
pub const DEFAULT_FADE_DELAY_FACTOR: f64 = 0.5;
/// Largest accepted `fadeDelayFactor`.
pub const MAX_FADE_DELAY_FACTOR: f64 = 100.0;
pub const DEFAULT_CLOSE_BUTTON_LABEL: &str = "×";
pub const DEFAULT_OVERLAY_COLOR: Color = Color::rgba(0, 0, 0, 102);
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::WHITE;
pub const DEFAULT_TEXT_COLOR: Color = Color::rgb(0x2a, 0x2a, 0x2a);
pub const DEFAULT_CORNER_RADIUS: Length = Length::Px(12.0);

/// Errors from validating or loading dialog options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The options file could not be read.
    Io(String),
    /// JSON text failed to parse.
    Json(String),
    /// TOML text failed to parse.
    Toml(String),
    /// A field parsed but holds an unusable value.
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "failed to read dialog options: {msg}"),
            Self::Json(msg) => write!(f, "invalid dialog options JSON: {msg}"),
            Self::Toml(msg) => write!(f, "invalid dialog options TOML: {msg}"),
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Partial dialog configuration. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default, deny_unknown_fields)
)]
pub struct DialogOptions {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fade_duration_ms: Option<u64>,
    /// Fraction of the fade duration to wait after mount before fading in.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fade_delay_factor: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub escape_closes: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub click_outside_closes: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub show_close_button: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub close_button_label: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub use_slide_transform: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub use_rounded_corners: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub overlay_color: Option<Color>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub background_color: Option<Color>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub text_color: Option<Color>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub corner_radius: Option<Length>,
    /// Return focus to the previously focused element after unmount.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub restore_focus: Option<bool>,
}

impl DialogOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn fade_duration_ms(mut self, ms: u64) -> Self {
        self.fade_duration_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn fade_delay_factor(mut self, factor: f64) -> Self {
        self.fade_delay_factor = Some(factor);
        self
    }

    #[must_use]
    pub fn escape_closes(mut self, enabled: bool) -> Self {
        self.escape_closes = Some(enabled);
        self
    }

    #[must_use]
    pub fn click_outside_closes(mut self, enabled: bool) -> Self {
        self.click_outside_closes = Some(enabled);
        self
    }

    #[must_use]
    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = Some(show);
        self
    }

    #[must_use]
    pub fn close_button_label(mut self, label: impl Into<String>) -> Self {
        self.close_button_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn use_slide_transform(mut self, enabled: bool) -> Self {
        self.use_slide_transform = Some(enabled);
        self
    }

    #[must_use]
    pub fn use_rounded_corners(mut self, enabled: bool) -> Self {
        self.use_rounded_corners = Some(enabled);
        self
    }

    #[must_use]
    pub fn overlay_color(mut self, color: Color) -> Self {
        self.overlay_color = Some(color);
        self
    }

    #[must_use]
    pub fn background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    #[must_use]
    pub fn text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self
    }

    #[must_use]
    pub fn corner_radius(mut self, radius: Length) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn restore_focus(mut self, enabled: bool) -> Self {
        self.restore_focus = Some(enabled);
        self
    }

    /// Layer `overrides` on top of `self`: fields set in `overrides` win.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        Self {
            fade_duration_ms: overrides.fade_duration_ms.or(self.fade_duration_ms),
            fade_delay_factor: overrides.fade_delay_factor.or(self.fade_delay_factor),
            escape_closes: overrides.escape_closes.or(self.escape_closes),
            click_outside_closes: overrides.click_outside_closes.or(self.click_outside_closes),
            show_close_button: overrides.show_close_button.or(self.show_close_button),
            close_button_label: overrides
                .close_button_label
                .clone()
                .or_else(|| self.close_button_label.clone()),
            use_slide_transform: overrides.use_slide_transform.or(self.use_slide_transform),
            use_rounded_corners: overrides.use_rounded_corners.or(self.use_rounded_corners),
            overlay_color: overrides.overlay_color.or(self.overlay_color),
            background_color: overrides.background_color.or(self.background_color),
            text_color: overrides.text_color.or(self.text_color),
            corner_radius: overrides.corner_radius.or(self.corner_radius),
            restore_focus: overrides.restore_focus.or(self.restore_focus),
        }
    }

    /// Strict check used when options arrive as data.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(factor) = self.fade_delay_factor
            && !(0.0..=MAX_FADE_DELAY_FACTOR).contains(&factor)
        {
            return Err(ConfigError::Invalid {
                field: "fadeDelayFactor",
                reason: format!("expected a number in 0..={MAX_FADE_DELAY_FACTOR}, got {factor}"),
            });
        }
        if let Some(radius) = self.corner_radius {
            let value = radius.value();
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field: "cornerRadius",
                    reason: format!("expected a non-negative length, got {radius}"),
                });
            }
        }
        Ok(())
    }

    /// Fill every unset field with its default.
    #[must_use]
    pub fn resolve(&self) -> DialogConfig {
        DialogConfig::from_options(self)
    }
}

#[cfg(feature = "policy-config")]
impl DialogOptions {
    /// Parse and validate options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(text).map_err(|e| ConfigError::Toml(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Parse and validate options from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let options: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a file, choosing the format by extension
    /// (`.json` is JSON, anything else is TOML).
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }
}

/// Fully resolved dialog configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogConfig {
    pub fade_duration_ms: u64,
    pub fade_delay_factor: f64,
    pub escape_closes: bool,
    pub click_outside_closes: bool,
    pub show_close_button: bool,
    pub close_button_label: String,
    pub use_slide_transform: bool,
    pub use_rounded_corners: bool,
    pub overlay_color: Color,
    pub background_color: Color,
    pub text_color: Color,
    pub corner_radius: Length,
    pub restore_focus: bool,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            fade_duration_ms: DEFAULT_FADE_DURATION_MS,
            fade_delay_factor: DEFAULT_FADE_DELAY_FACTOR,
            escape_closes: true,
            click_outside_closes: true,
            show_close_button: true,
            close_button_label: DEFAULT_CLOSE_BUTTON_LABEL.to_string(),
            use_slide_transform: true,
            use_rounded_corners: true,
            overlay_color: DEFAULT_OVERLAY_COLOR,
            background_color: DEFAULT_BACKGROUND_COLOR,
            text_color: DEFAULT_TEXT_COLOR,
            corner_radius: DEFAULT_CORNER_RADIUS,
            restore_focus: true,
        }
    }
}

impl DialogConfig {
    /// Merge `options` over the defaults.
    ///
    /// A negative or non-finite delay factor is replaced by the default and
    /// one above [`MAX_FADE_DELAY_FACTOR`] is clamped to it. Both are logged;
    /// resolution itself never fails.
    #[must_use]
    pub fn from_options(options: &DialogOptions) -> Self {
        let defaults = Self::default();
        let fade_delay_factor = match options.fade_delay_factor {
            Some(factor) if (0.0..=MAX_FADE_DELAY_FACTOR).contains(&factor) => factor,
            Some(factor) if factor > MAX_FADE_DELAY_FACTOR && factor.is_finite() => {
                tracing::warn!(
                    factor,
                    max = MAX_FADE_DELAY_FACTOR,
                    "dialog.config: clamping fade delay factor"
                );
                MAX_FADE_DELAY_FACTOR
            }
            Some(factor) => {
                tracing::warn!(
                    factor,
                    fallback = DEFAULT_FADE_DELAY_FACTOR,
                    "dialog.config: ignoring invalid fade delay factor"
                );
                DEFAULT_FADE_DELAY_FACTOR
            }
            None => defaults.fade_delay_factor,
        };
        Self {
            fade_duration_ms: options.fade_duration_ms.unwrap_or(defaults.fade_duration_ms),
            fade_delay_factor,
            escape_closes: options.escape_closes.unwrap_or(defaults.escape_closes),
            click_outside_closes: options
                .click_outside_closes
                .unwrap_or(defaults.click_outside_closes),
            show_close_button: options.show_close_button.unwrap_or(defaults.show_close_button),
            close_button_label: options
                .close_button_label
                .clone()
                .unwrap_or(defaults.close_button_label),
            use_slide_transform: options
                .use_slide_transform
                .unwrap_or(defaults.use_slide_transform),
            use_rounded_corners: options
                .use_rounded_corners
                .unwrap_or(defaults.use_rounded_corners),
            overlay_color: options.overlay_color.unwrap_or(defaults.overlay_color),
            background_color: options.background_color.unwrap_or(defaults.background_color),
            text_color: options.text_color.unwrap_or(defaults.text_color),
            corner_radius: options.corner_radius.unwrap_or(defaults.corner_radius),
            restore_focus: options.restore_focus.unwrap_or(defaults.restore_focus),
        }
    }

    /// Set fade duration in milliseconds.
    #[must_use]
    pub fn fade_duration_ms(mut self, ms: u64) -> Self {
        self.fade_duration_ms = ms;
        self
    }

    /// Set the fade-in delay factor.
    #[must_use]
    pub fn fade_delay_factor(mut self, factor: f64) -> Self {
        self.fade_delay_factor = factor;
        self
    }

    /// Set whether Escape closes the dialog.
    #[must_use]
    pub fn escape_closes(mut self, enabled: bool) -> Self {
        self.escape_closes = enabled;
        self
    }

    /// Set whether clicks on the overlay close the dialog.
    #[must_use]
    pub fn click_outside_closes(mut self, enabled: bool) -> Self {
        self.click_outside_closes = enabled;
        self
    }

    /// Set whether the close button is rendered.
    #[must_use]
    pub fn show_close_button(mut self, show: bool) -> Self {
        self.show_close_button = show;
        self
    }

    /// Length of the fade animation.
    #[must_use]
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    /// Wait between mount and the start of the fade-in.
    ///
    /// Saturates at [`Duration::MAX`] when the product overflows.
    #[must_use]
    pub fn fade_delay(&self) -> Duration {
        let factor = if self.fade_delay_factor.is_finite() {
            self.fade_delay_factor.max(0.0)
        } else {
            DEFAULT_FADE_DELAY_FACTOR
        };
        let secs = self.fade_duration_ms as f64 * factor / 1000.0;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// The corner radius actually rendered (`0` without rounded corners).
    #[must_use]
    pub fn effective_corner_radius(&self) -> Length {
        if self.use_rounded_corners {
            self.corner_radius
        } else {
            Length::ZERO
        }
    }
}

impl From<&DialogOptions> for DialogConfig {
    fn from(options: &DialogOptions) -> Self {
        Self::from_options(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_resolve_to_documented_defaults() {
        let config = DialogOptions::new().resolve();
        assert_eq!(config.fade_duration_ms, 300);
        assert_eq!(config.fade_delay_factor, 0.5);
        assert!(config.escape_closes);
        assert!(config.click_outside_closes);
        assert!(config.show_close_button);
        assert_eq!(config.close_button_label, "×");
        assert!(config.use_slide_transform);
        assert!(config.use_rounded_corners);
        assert_eq!(config.overlay_color.to_css(), "rgba(0, 0, 0, 0.4)");
        assert_eq!(config.background_color.to_css(), "#ffffff");
        assert_eq!(config.text_color.to_css(), "#2a2a2a");
        assert_eq!(config.corner_radius.to_string(), "12px");
        assert!(config.restore_focus);
        assert_eq!(config, DialogConfig::default());
    }

    #[test]
    fn set_fields_override_defaults() {
        let config = DialogOptions::new()
            .fade_duration_ms(120)
            .escape_closes(false)
            .close_button_label("Close")
            .resolve();
        assert_eq!(config.fade_duration_ms, 120);
        assert!(!config.escape_closes);
        assert_eq!(config.close_button_label, "Close");
        assert!(config.click_outside_closes);
    }

    #[test]
    fn fade_delay_is_duration_times_factor() {
        let config = DialogOptions::new()
            .fade_duration_ms(300)
            .fade_delay_factor(0.5)
            .resolve();
        assert_eq!(config.fade_delay(), Duration::from_millis(150));
        assert_eq!(config.fade_duration(), Duration::from_millis(300));

        let zero = DialogOptions::new().fade_delay_factor(0.0).resolve();
        assert_eq!(zero.fade_delay(), Duration::ZERO);
    }

    #[test]
    fn invalid_delay_factor_falls_back() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let config = DialogOptions::new().fade_delay_factor(bad).resolve();
            assert_eq!(config.fade_delay_factor, DEFAULT_FADE_DELAY_FACTOR);
        }
    }

    #[test]
    fn validate_rejects_what_resolve_sanitizes() {
        let err = DialogOptions::new()
            .fade_delay_factor(-0.5)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fadeDelayFactor", .. }));
        assert!(DialogOptions::new().fade_delay_factor(2.0).validate().is_ok());
    }

    #[test]
    fn oversized_delay_factor_is_rejected_and_clamped() {
        let options = DialogOptions::new().fade_delay_factor(1e20);
        let err = options.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fadeDelayFactor", .. }));
        assert!(
            DialogOptions::new()
                .fade_delay_factor(MAX_FADE_DELAY_FACTOR)
                .validate()
                .is_ok()
        );

        let config = options.fade_duration_ms(300).resolve();
        assert_eq!(config.fade_delay_factor, MAX_FADE_DELAY_FACTOR);
        assert_eq!(config.fade_delay(), Duration::from_millis(30_000));
    }

    #[test]
    fn fade_delay_saturates_instead_of_overflowing() {
        let config = DialogConfig::default()
            .fade_duration_ms(u64::MAX)
            .fade_delay_factor(1e20);
        assert_eq!(config.fade_delay(), Duration::MAX);
    }

    #[test]
    fn rounded_corners_off_renders_zero_radius() {
        let config = DialogOptions::new().use_rounded_corners(false).resolve();
        assert!(config.effective_corner_radius().is_zero());
        assert_eq!(config.corner_radius, DEFAULT_CORNER_RADIUS);
    }

    #[test]
    fn merged_prefers_overrides() {
        let base = DialogOptions::new().fade_duration_ms(100).escape_closes(false);
        let over = DialogOptions::new().fade_duration_ms(200);
        let merged = base.merged(&over);
        assert_eq!(merged.fade_duration_ms, Some(200));
        assert_eq!(merged.escape_closes, Some(false));
        assert!(DialogOptions::new().is_empty());
        assert!(!merged.is_empty());
    }

    #[test]
    fn config_builder_setters() {
        let config = DialogConfig::default()
            .fade_duration_ms(50)
            .escape_closes(false)
            .click_outside_closes(false)
            .show_close_button(false);
        assert_eq!(config.fade_duration(), Duration::from_millis(50));
        assert!(!config.escape_closes);
        assert!(!config.click_outside_closes);
        assert!(!config.show_close_button);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_camel_case_and_skips_unset() {
        let options = DialogOptions::new()
            .fade_duration_ms(200)
            .overlay_color(Color::rgba(0, 0, 0, 153));
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"fadeDurationMs":200,"overlayColor":"rgba(0, 0, 0, 0.6)"}"#);
        let back: DialogOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn policy_config_loads_toml_and_json() {
        let toml_text = r##"
            fadeDurationMs = 150
            escapeCloses = false
            backgroundColor = "#101010"
            cornerRadius = "4px"
        "##;
        let options = DialogOptions::from_toml_str(toml_text).unwrap();
        assert_eq!(options.fade_duration_ms, Some(150));
        assert_eq!(options.escape_closes, Some(false));
        assert_eq!(options.background_color, Some(Color::rgb(16, 16, 16)));
        assert_eq!(options.corner_radius, Some(Length::Px(4.0)));

        let json = DialogOptions::from_json_str(r#"{"showCloseButton": false}"#).unwrap();
        assert_eq!(json.show_close_button, Some(false));
    }

    #[cfg(feature = "policy-config")]
    #[test]
    fn policy_config_reports_errors() {
        assert!(matches!(
            DialogOptions::from_toml_str("fadeDurationMs = \"slow\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            DialogOptions::from_json_str(r#"{"unknownKey": 1}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            DialogOptions::from_json_str(r#"{"fadeDelayFactor": -1}"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            DialogOptions::load("/nonexistent/veil-dialog.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
