//! Application configuration
//!
//! ```rust
//! use trellis_app::AppConfig;
//!
//! let config = AppConfig::from_toml_str("width = 640\nscroll_step = 24").unwrap();
//! assert_eq!(config.width, 640);
//! assert_eq!(config.height, 600);
//! assert_eq!(config.scroll_step, 24);
//! ```

use serde::{Deserialize, Serialize};
use trellis_core::{StoreConfig, TrellisError};

/// Viewport, input and state-store settings for an [`App`](crate::App)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Viewport width in pixels
    pub width: i32,
    /// Viewport height in pixels
    pub height: i32,
    /// Pixels scrolled per wheel notch
    pub scroll_step: i32,
    /// Flush round ceiling; `None` never gives up
    pub max_flush_rounds: Option<usize>,
    /// Default tracing directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 600,
            scroll_step: 10,
            max_flush_rounds: Some(1024),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Default settings at a different viewport size
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Verbose logging and a tight flush ceiling
    pub fn debug() -> Self {
        Self {
            max_flush_rounds: Some(64),
            log_filter: "trellis_core=debug,trellis_layout=debug,trellis_app=trace".to_string(),
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, TrellisError> {
        toml::from_str(source).map_err(|err| TrellisError::Config(err.to_string()))
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_flush_rounds: self.max_flush_rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = AppConfig::from_toml_str(
            r#"
            height = 480
            log_filter = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.width, 300);
        assert_eq!(config.height, 480);
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.store_config().max_flush_rounds, Some(1024));
    }

    #[test]
    fn test_bad_document() {
        let err = AppConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, TrellisError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::debug();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }
}
