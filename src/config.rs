//! Session settings and configuration management.
//!
//! Settings follow a precedence chain, lowest to highest:
//! 1. Default values
//! 2. Configuration file (TOML/JSON)
//! 3. Environment variables (`WEBVIEW_EMBED_*`)
//! 4. Builder methods
//!
//! # Example
//!
//! ```rust
//! use webview_embed::config::SessionSettings;
//! use webview_embed::geometry::Rect;
//!
//! let settings = SessionSettings::default()
//!     .with_initial_bounds(Rect::from_size(1280, 720))
//!     .with_max_pending_windows(8);
//! assert_eq!(settings.initial_bounds.width, 1280);
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::geometry::Rect;

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to parse JSON configuration.
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

fn default_bounds() -> Rect {
    Rect::from_size(800, 600)
}

fn default_eager_surface() -> bool {
    true
}

/// Settings for a window session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Container bounds a session starts with before the embedder places it.
    #[serde(default = "default_bounds")]
    pub initial_bounds: Rect,

    /// Request the render surface as soon as a host is bound instead of
    /// waiting for the first bounds change.
    #[serde(default = "default_eager_surface")]
    pub eager_surface: bool,

    /// Maximum number of engine-created child windows held between their
    /// create and show callbacks (0 = unlimited).
    #[serde(default)]
    pub max_pending_windows: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            initial_bounds: default_bounds(),
            eager_surface: default_eager_surface(),
            max_pending_windows: 0,
        }
    }
}

impl SessionSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML or JSON file, dispatching on extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Parses settings from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a JSON string.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Applies `WEBVIEW_EMBED_*` environment variable overrides.
    ///
    /// Recognized: `WEBVIEW_EMBED_WIDTH`, `WEBVIEW_EMBED_HEIGHT`,
    /// `WEBVIEW_EMBED_EAGER_SURFACE`, `WEBVIEW_EMBED_MAX_PENDING_WINDOWS`.
    /// Unparsable values are logged and ignored.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(width) = read_env_parsed::<u32>("WEBVIEW_EMBED_WIDTH") {
            self.initial_bounds.width = width;
        }
        if let Some(height) = read_env_parsed::<u32>("WEBVIEW_EMBED_HEIGHT") {
            self.initial_bounds.height = height;
        }
        if let Some(eager) = read_env_parsed::<bool>("WEBVIEW_EMBED_EAGER_SURFACE") {
            self.eager_surface = eager;
        }
        if let Some(max) = read_env_parsed::<usize>("WEBVIEW_EMBED_MAX_PENDING_WINDOWS") {
            self.max_pending_windows = max;
        }
        self
    }

    /// Sets the initial container bounds.
    pub fn with_initial_bounds(mut self, bounds: Rect) -> Self {
        self.initial_bounds = bounds;
        self
    }

    /// Controls eager surface creation at bind time.
    pub fn with_eager_surface(mut self, eager: bool) -> Self {
        self.eager_surface = eager;
        self
    }

    /// Caps the pending child window table (0 = unlimited).
    pub fn with_max_pending_windows(mut self, max: usize) -> Self {
        self.max_pending_windows = max;
        self
    }

    /// Checks the settings for internally inconsistent values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eager_surface && self.initial_bounds.is_empty() {
            // Not fatal: the surface request is retried once bounds arrive.
            warn!(
                bounds = %self.initial_bounds,
                "eager_surface set with empty initial bounds; surface creation will be deferred"
            );
        }
        Ok(())
    }

    /// Serializes the settings to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|err| ConfigError::ValidationError(err.to_string()))
    }
}

fn read_env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, raw = %raw, "ignoring unparsable environment override");
            None
        }
    }
}
