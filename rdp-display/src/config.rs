//! Configuration for the cursor pipeline.

use rdp_pixelbuffer::ScaleFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating a [`PointerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Cursor pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Scale the session image to the window size instead of using a fixed
    /// content scale.
    pub smart_sizing: bool,
    /// Fixed session-to-window scale used when smart sizing is off.
    pub content_scale: f64,
    /// Build cursors as a 100% image with a full resolution alternate so the
    /// platform picks the right size on HiDPI monitors.
    pub hidpi_alternate: bool,
    /// Filter used when cursor surfaces are resized for export, e.g. to
    /// write a 100% snapshot. Cursor shapes themselves are always resampled
    /// linearly.
    pub scale_filter: ScaleFilter,
    /// Largest cursor edge, in pixels, the platform accepts.
    pub max_cursor_size: u32,
}

fn default_max_cursor_size() -> u32 {
    256
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            smart_sizing: false,
            content_scale: 1.0,
            hidpi_alternate: true,
            scale_filter: ScaleFilter::default(),
            max_cursor_size: default_max_cursor_size(),
        }
    }
}

impl PointerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> PointerConfigBuilder {
        PointerConfigBuilder::default()
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.content_scale.is_finite() || self.content_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "content_scale must be a positive number, got {}",
                self.content_scale
            )));
        }

        if self.max_cursor_size == 0 {
            return Err(ConfigError::Invalid(
                "max_cursor_size cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for creating a `PointerConfig`.
#[derive(Default)]
pub struct PointerConfigBuilder {
    config: PointerConfig,
}

impl PointerConfigBuilder {
    /// Enables or disables smart sizing.
    #[must_use]
    pub fn smart_sizing(mut self, enabled: bool) -> Self {
        self.config.smart_sizing = enabled;
        self
    }

    /// Sets the fixed content scale.
    #[must_use]
    pub fn content_scale(mut self, scale: f64) -> Self {
        self.config.content_scale = scale;
        self
    }

    /// Enables or disables the HiDPI alternate image.
    #[must_use]
    pub fn hidpi_alternate(mut self, enabled: bool) -> Self {
        self.config.hidpi_alternate = enabled;
        self
    }

    /// Sets the cursor resampling filter.
    #[must_use]
    pub fn scale_filter(mut self, filter: ScaleFilter) -> Self {
        self.config.scale_filter = filter;
        self
    }

    /// Sets the platform cursor size limit.
    #[must_use]
    pub fn max_cursor_size(mut self, size: u32) -> Self {
        self.config.max_cursor_size = size;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<PointerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
