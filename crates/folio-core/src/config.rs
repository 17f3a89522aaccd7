use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Deck file to present instead of the built-in catalog
    #[serde(default)]
    pub deck: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            deck: None,
        }
    }
}

/// Easing curve applied to transition progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingType {
    Linear,
    #[default]
    QuadraticInOut,
    CubicInOut,
    CubicOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Length of one section transition in milliseconds
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Minimum time between accepted scroll steps (must be >= duration_ms)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Easing curve
    #[serde(default)]
    pub easing: EasingType,
    /// Watchdog fires after duration_ms * watchdog_factor
    #[serde(default = "default_watchdog_factor")]
    pub watchdog_factor: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            cooldown_ms: default_cooldown_ms(),
            easing: EasingType::default(),
            watchdog_factor: default_watchdog_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical distance between page centers
    #[serde(default = "default_page_spacing")]
    pub page_spacing: f32,
    /// Distance from the camera to the page plane
    #[serde(default = "default_camera_standoff")]
    pub camera_standoff: f32,
    /// Scale of pages that are not in focus
    #[serde(default = "default_inactive_scale")]
    pub inactive_scale: f32,
    /// Depth offset of pages that are not in focus
    #[serde(default = "default_inactive_depth")]
    pub inactive_depth: f32,
    /// Overlay pixels to world units
    #[serde(default = "default_overlay_scale")]
    pub overlay_scale: f32,
    #[serde(default = "default_page_width")]
    pub page_width: f32,
    #[serde(default = "default_page_height")]
    pub page_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_spacing: default_page_spacing(),
            camera_standoff: default_camera_standoff(),
            inactive_scale: default_inactive_scale(),
            inactive_depth: default_inactive_depth(),
            overlay_scale: default_overlay_scale(),
            page_width: default_page_width(),
            page_height: default_page_height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Smoothed velocity a scroll event must exceed to step a section
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,
    /// Fraction of the remaining distance the smoother covers per frame
    #[serde(default = "default_smoothing_lerp")]
    pub smoothing_lerp: f64,
    /// Multiplier applied to raw wheel deltas
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: default_velocity_threshold(),
            smoothing_lerp: default_smoothing_lerp(),
            wheel_multiplier: default_wheel_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while a transition or smoothed scroll is running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Theme name
    #[serde(default = "default_theme_name")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            theme: default_theme_name(),
        }
    }
}

/// Transition timings derived from a single [`TransitionConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTiming {
    pub duration: Duration,
    pub cooldown: Duration,
    pub watchdog: Duration,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duration_ms() -> u64 {
    800
}

fn default_cooldown_ms() -> u64 {
    800
}

fn default_watchdog_factor() -> f64 {
    2.0
}

/// Upper bound for `transition.watchdog_factor`
pub const MAX_WATCHDOG_FACTOR: f64 = 100.0;

fn default_page_spacing() -> f32 {
    18.0
}

fn default_camera_standoff() -> f32 {
    12.0
}

fn default_inactive_scale() -> f32 {
    0.85
}

fn default_inactive_depth() -> f32 {
    -2.0
}

fn default_overlay_scale() -> f32 {
    0.01 // 1000px of overlay width = 10 world units
}

fn default_page_width() -> f32 {
    10.0
}

fn default_page_height() -> f32 {
    14.14 // A4 ratio
}

fn default_velocity_threshold() -> f64 {
    0.2
}

fn default_smoothing_lerp() -> f64 {
    0.08
}

fn default_wheel_multiplier() -> f64 {
    1.0
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_theme_name() -> String {
    "midnight".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl TransitionConfig {
    pub fn timing(&self) -> TransitionTiming {
        let duration = Duration::from_millis(self.duration_ms);
        TransitionTiming {
            duration,
            cooldown: Duration::from_millis(self.cooldown_ms),
            // Saturates; the driver refuses a deadline it cannot represent
            watchdog: Duration::try_from_secs_f64(
                duration.as_secs_f64() * self.watchdog_factor.max(1.0),
            )
            .unwrap_or(Duration::MAX),
        }
    }
}

impl FolioConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/folio/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("folio")
            .join("config.toml")
    }

    /// Directory for log files
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
    }

    /// Deck path with tilde expansion
    pub fn deck_path(&self) -> Option<PathBuf> {
        self.general.deck.as_deref().map(expand_tilde)
    }

    pub fn timing(&self) -> TransitionTiming {
        self.transition.timing()
    }

    /// Reject settings the transition state machine cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let t = &self.transition;
        if t.duration_ms == 0 {
            return Err(invalid("transition.duration_ms must be greater than zero"));
        }
        if t.cooldown_ms < t.duration_ms {
            return Err(invalid(format!(
                "transition.cooldown_ms ({}) must be >= transition.duration_ms ({})",
                t.cooldown_ms, t.duration_ms
            )));
        }
        if !(t.watchdog_factor >= 1.0 && t.watchdog_factor <= MAX_WATCHDOG_FACTOR) {
            return Err(invalid(format!(
                "transition.watchdog_factor must be in [1, {}]",
                MAX_WATCHDOG_FACTOR
            )));
        }

        let l = &self.layout;
        for (name, value) in [
            ("layout.page_spacing", l.page_spacing),
            ("layout.camera_standoff", l.camera_standoff),
            ("layout.inactive_scale", l.inactive_scale),
            ("layout.overlay_scale", l.overlay_scale),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(format!("{} must be a positive number", name)));
            }
        }
        if !l.inactive_depth.is_finite() {
            return Err(invalid("layout.inactive_depth must be finite"));
        }

        let s = &self.scroll;
        if !(s.velocity_threshold >= 0.0) {
            return Err(invalid("scroll.velocity_threshold must not be negative"));
        }
        if !(s.smoothing_lerp > 0.0 && s.smoothing_lerp <= 1.0) {
            return Err(invalid("scroll.smoothing_lerp must be in (0, 1]"));
        }
        if !(s.wheel_multiplier > 0.0 && s.wheel_multiplier.is_finite()) {
            return Err(invalid("scroll.wheel_multiplier must be a positive number"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> crate::Error {
    crate::Error::Config(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.transition.duration_ms, 800);
        assert_eq!(config.transition.cooldown_ms, 800);
        assert_eq!(config.transition.easing, EasingType::QuadraticInOut);
        assert_eq!(config.layout.page_spacing, 18.0);
        assert_eq!(config.layout.camera_standoff, 12.0);
        assert_eq!(config.layout.inactive_scale, 0.85);
        assert_eq!(config.layout.inactive_depth, -2.0);
        assert_eq!(config.scroll.velocity_threshold, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timing_derived_from_one_section() {
        let config = TransitionConfig {
            duration_ms: 500,
            cooldown_ms: 600,
            ..Default::default()
        };
        let timing = config.timing();
        assert_eq!(timing.duration, Duration::from_millis(500));
        assert_eq!(timing.cooldown, Duration::from_millis(600));
        assert_eq!(timing.watchdog, Duration::from_millis(1000));
    }

    #[test]
    fn test_cooldown_shorter_than_duration_rejected() {
        let mut config = FolioConfig::default();
        config.transition.cooldown_ms = 500;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut config = FolioConfig::default();
        config.layout.inactive_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = FolioConfig::default();
        config.scroll.smoothing_lerp = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_watchdog_factor_bounds() {
        for factor in [f64::INFINITY, f64::NAN, 1.2e19, 0.5, MAX_WATCHDOG_FACTOR + 1.0] {
            let mut config = FolioConfig::default();
            config.transition.watchdog_factor = factor;
            assert!(config.validate().is_err(), "factor {} accepted", factor);
        }

        let mut config = FolioConfig::default();
        config.transition.watchdog_factor = MAX_WATCHDOG_FACTOR;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unrepresentable_watchdog_saturates() {
        let config = TransitionConfig {
            watchdog_factor: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(config.timing().watchdog, Duration::MAX);

        let config = TransitionConfig {
            watchdog_factor: 1e20,
            ..Default::default()
        };
        assert_eq!(config.timing().watchdog, Duration::MAX);
    }

    #[test]
    fn test_wheel_multiplier_must_be_finite_and_positive() {
        for multiplier in [f64::NAN, f64::INFINITY, 0.0, -1.0] {
            let mut config = FolioConfig::default();
            config.scroll.wheel_multiplier = multiplier;
            assert!(config.validate().is_err(), "multiplier {} accepted", multiplier);
        }
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FolioConfig = toml::from_str(
            r#"
            [transition]
            duration_ms = 400
            cooldown_ms = 450
            easing = "cubic-out"
            "#,
        )
        .unwrap();
        assert_eq!(config.transition.duration_ms, 400);
        assert_eq!(config.transition.easing, EasingType::CubicOut);
        assert_eq!(config.transition.watchdog_factor, 2.0);
        assert_eq!(config.layout.page_spacing, 18.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("folio-config-does-not-exist.toml");
        let config = FolioConfig::load_from(&path).unwrap();
        assert_eq!(config.transition.duration_ms, 800);
    }
}
