//! Shell Configuration
//!
//! Loaded from a YAML file with defaults for every field.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`KHETGO_GATEWAY_URL`, `KHETGO_GATEWAY_KEY`,
//!    `KHETGO_WEATHER_API_KEY`, `KHETGO_ADVISORY_API_KEY`)
//! 2. Config file
//! 3. Defaults

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub gateway: GatewayConfig,
    pub weather: WeatherConfig,
    pub advisory: AdvisoryConfig,
    pub geolocation: GeolocationConfig,
    pub ui: UiConfig,
    pub offline: OfflineConfig,
}

/// Backend (database / auth / storage) connection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            timeout_ms: 20_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeolocationConfig {
    pub timeout_ms: u64,
    /// Used when the lookup fails or times out
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        // Nagpur
        Self {
            timeout_ms: 10_000,
            fallback_latitude: 21.1458,
            fallback_longitude: 79.0882,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub debounce_ms: u64,
    pub max_notices: usize,
    pub discard_stale_responses: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_notices: 20,
            discard_stale_responses: true,
        }
    }
}

/// Offline shell cache layout and routing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OfflineConfig {
    /// Versioned shell cache name
    pub cache_version: String,
    pub runtime_cache: String,
    pub assets_cache: String,
    /// Origin used to resolve relative asset paths
    pub origin: String,
    /// Pre-cached on install
    pub static_assets: Vec<String>,
    /// URL fragments served cache-first
    pub asset_first: Vec<String>,
    /// URL fragments served network-first
    pub network_first: Vec<String>,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            cache_version: "khetgo-v1.0.0".to_string(),
            runtime_cache: "khetgo-runtime".to_string(),
            assets_cache: "khetgo-assets".to_string(),
            origin: "http://localhost:5173".to_string(),
            static_assets: owned(&[
                "/",
                "/index.html",
                "/src/main.js",
                "/src/style.css",
                "/manifest.json",
                "/khetgo_dashboard_mockup.png",
                "/khetgo_hero_promo.png",
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
            ]),
            asset_first: owned(&[
                "/khetgo_dashboard_mockup.png",
                "/khetgo_hero_promo.png",
                "https://cdnjs.cloudflare.com/ajax/",
                "https://fonts.googleapis.com/",
                "https://fonts.gstatic.com/",
            ]),
            network_first: owned(&[
                ".supabase.co/",
                "https://api.openweathermap.org/",
                "https://generativelanguage.googleapis.com/",
            ]),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a YAML file.
    ///
    /// Returns the default config when `path` does not exist and an error
    /// when it exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ShellError::Config {
            reason: format!("Failed to read config file: {}", e),
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ShellError::Config {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Merge with environment variables; env wins over the file
    pub fn with_env(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(url) = var("KHETGO_GATEWAY_URL") {
            self.gateway.url = Some(url);
        }
        if let Some(key) = var("KHETGO_GATEWAY_KEY") {
            self.gateway.key = Some(key);
        }
        if let Some(key) = var("KHETGO_WEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = var("KHETGO_ADVISORY_API_KEY") {
            self.advisory.api_key = Some(key);
        }

        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.ui.debounce_ms)
    }

    /// Copy safe to print: every key masked
    pub fn masked(&self) -> Self {
        let mask = |key: &Option<String>| key.as_deref().map(|k| mask_api_key(k, 4));
        let mut out = self.clone();
        out.gateway.key = mask(&self.gateway.key);
        out.weather.api_key = mask(&self.weather.api_key);
        out.advisory.api_key = mask(&self.advisory.api_key);
        out
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Mask an API key for display, e.g. `AIza***`
pub fn mask_api_key(key: &str, visible_chars: usize) -> String {
    if key.is_empty() {
        return String::new();
    }

    let visible: String = key.chars().take(visible_chars).collect();
    format!("{}***", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ShellConfig::load(&temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.ui.debounce_ms, 300);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ShellConfig::from_yaml("ui:\n  debounce_ms: 50\n").unwrap();
        assert_eq!(config.ui.debounce_ms, 50);
        assert_eq!(config.ui.max_notices, 20);
        assert_eq!(config.offline.cache_version, "khetgo-v1.0.0");
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = ShellConfig::from_yaml("ui: [").unwrap_err();
        assert!(matches!(err, ShellError::Config { .. }));
    }

    #[test]
    fn test_env_overrides_config() {
        env::set_var("KHETGO_WEATHER_API_KEY", "owm-from-env");

        let config = ShellConfig {
            weather: WeatherConfig {
                api_key: Some("owm-from-file".into()),
                ..Default::default()
            },
            ..Default::default()
        }
        .with_env();

        assert_eq!(config.weather.api_key.as_deref(), Some("owm-from-env"));

        env::remove_var("KHETGO_WEATHER_API_KEY");
    }

    #[test]
    fn test_masked_hides_keys() {
        let config = ShellConfig {
            advisory: AdvisoryConfig {
                api_key: Some("AIzaSySecret".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let yaml = config.masked().to_yaml().unwrap();
        assert!(yaml.contains("AIza***"));
        assert!(!yaml.contains("Secret"));
    }

    #[test]
    fn test_mask_api_key_short() {
        assert_eq!(mask_api_key("ab", 4), "ab***");
        assert_eq!(mask_api_key("", 4), "");
    }
}
