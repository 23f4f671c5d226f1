//! Hourglass vortex shape parameters.

use serde::{Deserialize, Serialize};

use super::ensure;
use crate::error::EngineResult;

/// Hourglass profile configuration
///
/// Radii are in normalized focus units; only their ratio to `tail_radius`
/// reaches the focus vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VortexParams {
    /// Radius at the pinch point (z = 0)
    pub throat_radius: f64,

    /// Radius at the extremes (|z| = 1)
    pub tail_radius: f64,

    /// How quickly the radius grows away from the throat
    pub shape_exponent: f64,
}

impl Default for VortexParams {
    fn default() -> Self {
        Self {
            throat_radius: 0.010, // tight throat
            tail_radius: 0.060,   // fat tails
            shape_exponent: 1.5,
        }
    }
}

impl VortexParams {
    pub fn validate(&self) -> EngineResult<()> {
        ensure(
            self.throat_radius.is_finite() && self.throat_radius >= 0.0,
            || format!("vortex.throat_radius must be >= 0, got {}", self.throat_radius),
        )?;
        ensure(
            self.tail_radius.is_finite() && self.tail_radius > 0.0,
            || format!("vortex.tail_radius must be > 0, got {}", self.tail_radius),
        )?;
        ensure(self.tail_radius >= self.throat_radius, || {
            format!(
                "vortex.tail_radius ({}) must not be smaller than throat_radius ({})",
                self.tail_radius, self.throat_radius
            )
        })?;
        ensure(
            self.shape_exponent.is_finite() && self.shape_exponent > 0.0,
            || format!("vortex.shape_exponent must be > 0, got {}", self.shape_exponent),
        )?;
        Ok(())
    }
}
