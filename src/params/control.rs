//! Control loop timing parameters.

use serde::{Deserialize, Serialize};

use super::ensure;
use crate::error::EngineResult;

/// Control loop timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParams {
    /// Nominal rate of the virtual tick derived from wall-clock time (Hz)
    pub target_hz: f64,

    /// Control loop iteration rate (Hz)
    /// 1000 = 1ms period
    pub control_hz: f64,

    /// Duration of one full vortex sweep (seconds)
    pub sweep_period_s: f64,

    /// Interval between status records (seconds)
    pub status_interval_s: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            target_hz: 8888.0,
            control_hz: 1000.0,
            sweep_period_s: 8.0,
            status_interval_s: 1.0,
        }
    }
}

impl ControlParams {
    pub fn validate(&self) -> EngineResult<()> {
        let positive = [
            ("control.target_hz", self.target_hz),
            ("control.control_hz", self.control_hz),
            ("control.sweep_period_s", self.sweep_period_s),
            ("control.status_interval_s", self.status_interval_s),
        ];
        for (name, value) in positive {
            ensure(value.is_finite() && value > 0.0, || {
                format!("{} must be finite and > 0, got {}", name, value)
            })?;
        }
        Ok(())
    }
}
