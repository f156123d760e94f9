use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrollFxConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub navigator: NavigatorConfig,
    #[serde(default)]
    pub resize: ResizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Selector for elements that get scanned for geometry
    #[serde(default = "default_selector")]
    pub selector: String,
    /// Selector for elements whose clicks request a scroll-to
    #[serde(default = "default_scroll_to_selector")]
    pub scroll_to_selector: String,
    /// Reverse the wheel direction
    #[serde(default)]
    pub reversed: bool,
    /// Class set on the document root while initialized
    #[serde(default = "default_root_class")]
    pub root_class: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            selector: default_selector(),
            scroll_to_selector: default_scroll_to_selector(),
            reversed: false,
            root_class: default_root_class(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Class added when an element enters the viewport
    #[serde(default = "default_inview_class")]
    pub inview_class: String,
    /// Class carried by a pinned sticky element
    #[serde(default = "default_sticky_class")]
    pub sticky_class: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            inview_class: default_inview_class(),
            sticky_class: default_sticky_class(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Default scroll-to animation speed, passed through to the engine
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            speed_ms: default_speed_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// Quiet period before a burst of resizes triggers one update
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ResizeConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_selector() -> String {
    ".js-animate".to_string()
}

fn default_scroll_to_selector() -> String {
    ".js-scrollto".to_string()
}

fn default_root_class() -> String {
    "has-smooth-scroll".to_string()
}

/// Class added to elements in view unless they set `data-inview-class`
pub const DEFAULT_INVIEW_CLASS: &str = "is-show";

fn default_inview_class() -> String {
    DEFAULT_INVIEW_CLASS.to_string()
}

fn default_sticky_class() -> String {
    "is-sticky".to_string()
}

fn default_speed_ms() -> u64 {
    800
}

fn default_debounce_ms() -> u64 {
    20
}

impl ScrollFxConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollfx/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollfx")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScrollFxConfig::default();
        assert_eq!(config.scroll.selector, ".js-animate");
        assert_eq!(config.trigger.inview_class, "is-show");
        assert_eq!(config.navigator.speed_ms, 800);
        assert_eq!(config.resize.debounce(), Duration::from_millis(20));
        assert!(!config.scroll.reversed);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScrollFxConfig::from_toml(
            r#"
            [scroll]
            reversed = true

            [trigger]
            inview_class = "in-view"
            "#,
        )
        .unwrap();

        assert!(config.scroll.reversed);
        assert_eq!(config.scroll.selector, ".js-animate");
        assert_eq!(config.trigger.inview_class, "in-view");
        assert_eq!(config.trigger.sticky_class, "is-sticky");
    }

    #[test]
    fn test_invalid_toml() {
        let err = ScrollFxConfig::from_toml("[scroll]\nreversed = \"maybe\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip_preserves_values() {
        let mut config = ScrollFxConfig::default();
        config.navigator.speed_ms = 1200;
        let parsed = ScrollFxConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.navigator.speed_ms, 1200);
    }
}
