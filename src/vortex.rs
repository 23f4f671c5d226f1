//! Hourglass vortex position model.
//!
//! Maps a sweep position `z ∈ [-1, 1]` (tail, throat at 0, other tail) to a
//! normalized 3-D focus vector and a gain. Stateless given its parameters.

use glam::DVec3;
use std::f64::consts::{PI, TAU};
use std::fmt::Write;

use crate::params::VortexParams;

/// Fallback tick rate used when a non-positive rate reaches `z_from_tick`
const DEFAULT_TARGET_HZ: f64 = 8888.0;

/// Exponent giving the gain curve its convex shape
const GAIN_CURVE_EXPONENT: f64 = 1.1;

/// Sample positions for `profile_grid`
const GRID_POSITIONS: [f64; 9] = [-1.0, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75, 1.0];

/// One row of the hourglass profile table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRow {
    pub z: f64,
    pub throat_radius: f64,
    pub radius: f64,
    pub gain: f64,
}

/// Hourglass radius and gain profile
#[derive(Debug, Clone, Copy)]
pub struct VortexPositionModel {
    params: VortexParams,
}

impl Default for VortexPositionModel {
    fn default() -> Self {
        Self::new(VortexParams::default())
    }
}

impl VortexPositionModel {
    pub fn new(params: VortexParams) -> Self {
        Self { params }
    }

    /// Radius of the column at sweep position `z`
    pub fn hourglass_radius(&self, z: f64) -> f64 {
        let blend = clamp_z(z).abs().powf(self.params.shape_exponent);
        self.params.throat_radius + (self.params.tail_radius - self.params.throat_radius) * blend
    }

    /// Gain at sweep position `z`: ~1.0 at the throat, ~0.5 at the tails
    pub fn gain_for_z(&self, z: f64) -> f64 {
        let base = 0.5 + 0.5 * (1.0 - clamp_z(z).abs());
        base.clamp(0.0, 1.0).powf(GAIN_CURVE_EXPONENT)
    }

    /// Focus vector and gain for sweep position `z`
    ///
    /// x,y spiral around the axis scaled by the hourglass radius and are
    /// normalized against the tail radius; z is mapped from [-1, 1] into [0, 1].
    /// Every component of the returned vector lies in [0, 1].
    pub fn sample_xyz_and_gain(&self, z: f64) -> (DVec3, f64) {
        let z = clamp_z(z);
        let radius = self.hourglass_radius(z);
        let gain = self.gain_for_z(z);

        let angle = PI * (z + 1.0); // one full turn across [-1, 1]
        let x = radius * angle.cos();
        let y = radius * angle.sin();

        let max_radius = if self.params.tail_radius > 0.0 {
            self.params.tail_radius
        } else {
            1.0
        };
        let focus = DVec3::new(
            0.5 + 0.5 * (x / max_radius),
            0.5 + 0.5 * (y / max_radius),
            0.5 * (z + 1.0),
        )
        .clamp(DVec3::ZERO, DVec3::ONE);

        (focus, gain)
    }

    /// Sweep position for a virtual tick
    ///
    /// Depends only on virtual elapsed time (`tick / target_hz`), so the sweep
    /// is independent of control-loop cadence and jitter.
    pub fn z_from_tick(tick: u64, target_hz: f64, sweep_period_s: f64) -> f64 {
        let target_hz = if target_hz > 0.0 {
            target_hz
        } else {
            DEFAULT_TARGET_HZ
        };
        if sweep_period_s.is_nan() || sweep_period_s <= 0.0 {
            return 0.0;
        }
        let t = tick as f64 / target_hz;
        let phase = (t / sweep_period_s) * TAU;
        phase.sin()
    }

    /// Radius and gain sampled across the sweep, tail to tail
    pub fn profile_grid(&self) -> Vec<ProfileRow> {
        GRID_POSITIONS
            .iter()
            .map(|&z| ProfileRow {
                z,
                throat_radius: self.params.throat_radius,
                radius: self.hourglass_radius(z),
                gain: self.gain_for_z(z),
            })
            .collect()
    }

    /// Profile grid as an aligned text table
    pub fn profile_table(&self) -> String {
        let mut table = String::new();
        let _ = writeln!(
            table,
            "{:>6}  {:>10}  {:>13}  {:>6}",
            "z", "r0(throat)", "r1(hourglass)", "gain"
        );
        let _ = writeln!(table, "{}", "-".repeat(41));
        for row in self.profile_grid() {
            let _ = writeln!(
                table,
                "{:>6.3}  {:>10.3}  {:>13.3}  {:>6.3}",
                row.z, row.throat_radius, row.radius, row.gain
            );
        }
        table
    }
}

/// Clamp into [-1, 1]; non-finite positions collapse to the throat.
fn clamp_z(z: f64) -> f64 {
    if z.is_finite() {
        z.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
