//! Audio render configuration and constants.

use serde::{Deserialize, Serialize};

use super::ensure;
use crate::error::EngineResult;

/// Number of oscillator voices ("flame tips")
pub const VOICE_COUNT: usize = 4;

/// Lowest frequency any voice may be assigned (Hz)
pub const FREQ_FLOOR_HZ: f64 = 88.0;

/// Highest frequency any voice may be assigned (Hz)
pub const FREQ_CEILING_HZ: f64 = 8888.0;

/// Audio render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioParams {
    /// Requested output sample rate (Hz)
    pub sample_rate_hz: u32,

    /// Frequency of the highest voice before golden-ratio division (Hz)
    pub top_frequency_hz: f64,

    /// Per-block single-pole smoothing coefficient, in (0, 1]
    /// Formula: amp += alpha * (target - amp)
    pub smoothing_alpha: f64,

    /// Drive into the tanh soft limiter on the mixed bus
    pub global_gain: f64,

    /// Stereo positions of the voices, deep to tip, each in [-1, 1]
    pub pan_positions: [f64; VOICE_COUNT],
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            top_frequency_hz: 8888.0,
            smoothing_alpha: 0.08,
            global_gain: 0.8,
            pan_positions: [-0.75, -0.25, 0.25, 0.75], // farL, midL, midR, farR
        }
    }
}

impl AudioParams {
    pub fn validate(&self) -> EngineResult<()> {
        ensure(self.sample_rate_hz > 0, || {
            "audio.sample_rate_hz must be > 0".to_string()
        })?;
        ensure(
            self.top_frequency_hz.is_finite() && self.top_frequency_hz > 0.0,
            || {
                format!(
                    "audio.top_frequency_hz must be finite and > 0, got {}",
                    self.top_frequency_hz
                )
            },
        )?;
        ensure(
            self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0,
            || {
                format!(
                    "audio.smoothing_alpha must be in (0, 1], got {}",
                    self.smoothing_alpha
                )
            },
        )?;
        ensure(
            self.global_gain.is_finite() && self.global_gain >= 0.0,
            || format!("audio.global_gain must be >= 0, got {}", self.global_gain),
        )?;
        for pan in self.pan_positions {
            ensure((-1.0..=1.0).contains(&pan), || {
                format!("audio.pan_positions entries must be in [-1, 1], got {}", pan)
            })?;
        }
        Ok(())
    }
}
