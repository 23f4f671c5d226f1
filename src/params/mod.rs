//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Physical units (Hz, seconds, normalized radius)
//! - Documented defaults and valid ranges
//! - A single `EngineConfig` value constructed once and passed into the engine

mod audio;
mod control;
mod vortex;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, EngineResult};

// Re-export all types
pub use audio::{AudioParams, FREQ_CEILING_HZ, FREQ_FLOOR_HZ, VOICE_COUNT};
pub use control::ControlParams;
pub use vortex::VortexParams;

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub audio: AudioParams,
    pub control: ControlParams,
    pub vortex: VortexParams,
}

impl EngineConfig {
    /// Load configuration from a TOML file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(text: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(text)
            .map_err(|e| EngineError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> EngineResult<()> {
        self.audio.validate()?;
        self.control.validate()?;
        self.vortex.validate()?;
        Ok(())
    }
}

pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> EngineResult<()> {
    if condition {
        Ok(())
    } else {
        Err(EngineError::Config(message()))
    }
}
