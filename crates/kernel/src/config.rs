use serde::{Deserialize, Serialize};
use stagecraft_render::Surface;
use std::path::Path;

/// Errors from loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine settings. Every field has a default, so a config file only needs
/// to name what it changes.
///
/// ```yaml
/// fixed_delta: 0.016
/// start_paused: false
/// surface:
///   width: 800
///   height: 600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deterministic step in seconds. `None` uses the wall clock.
    pub fixed_delta: Option<f32>,
    /// Upper bound on a single wall-clock delta, in seconds.
    pub max_delta: f32,
    pub start_paused: bool,
    /// Surface for the default renderer built by `Engine::initialize`.
    pub surface: Surface,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_delta: None,
            max_delta: 0.1,
            start_paused: false,
            surface: Surface::default(),
        }
    }
}

impl EngineConfig {
    /// Config with a deterministic clock step.
    pub fn fixed(step: f32) -> Self {
        Self {
            fixed_delta: Some(step),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_delta.is_nan() || self.max_delta <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_delta must be positive, got {}",
                self.max_delta
            )));
        }
        if let Some(step) = self.fixed_delta {
            if step.is_nan() || step <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "fixed_delta must be positive, got {step}"
                )));
            }
        }
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(ConfigError::Invalid("surface must have a non-zero size".into()));
        }
        Ok(())
    }
}
