//! Voice frequencies (golden-ratio ladder) and constant-power pan law.

use crate::params::{FREQ_CEILING_HZ, FREQ_FLOOR_HZ, VOICE_COUNT};

/// Golden ratio
pub const PHI: f64 = 1.618_033_988_749_895;

/// Powers of PHI dividing the top frequency, deep voice first
const LADDER_EXPONENTS: [i32; VOICE_COUNT] = [3, 2, 1, 0];

/// The four voice frequencies, deep to tip
///
/// Each lies in [FREQ_FLOOR_HZ, FREQ_CEILING_HZ] and the set is
/// non-decreasing by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveFrequencySet([f64; VOICE_COUNT]);

impl OctaveFrequencySet {
    /// Divide `top_hz` by successive powers of PHI and clamp into range
    pub fn from_top(top_hz: f64) -> Self {
        let top_hz = if top_hz.is_finite() {
            top_hz
        } else {
            FREQ_CEILING_HZ
        };
        let mut freqs = [0.0; VOICE_COUNT];
        for (freq, exp) in freqs.iter_mut().zip(LADDER_EXPONENTS) {
            *freq = (top_hz / PHI.powi(exp)).clamp(FREQ_FLOOR_HZ, FREQ_CEILING_HZ);
        }
        Self(freqs)
    }

    pub fn as_array(&self) -> [f64; VOICE_COUNT] {
        self.0
    }
}

/// Fixed constant-power pan coefficients for every voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanLaw {
    pub left: [f64; VOICE_COUNT],
    pub right: [f64; VOICE_COUNT],
}

impl PanLaw {
    pub fn new(positions: &[f64; VOICE_COUNT]) -> Self {
        let mut left = [0.0; VOICE_COUNT];
        let mut right = [0.0; VOICE_COUNT];
        for (i, &pan) in positions.iter().enumerate() {
            (left[i], right[i]) = constant_power(pan);
        }
        Self { left, right }
    }
}

/// Left/right gains for a pan position in [-1, 1]; left² + right² = 1
pub fn constant_power(pan: f64) -> (f64, f64) {
    let pan = if pan.is_finite() {
        pan.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    ((0.5 * (1.0 - pan)).sqrt(), (0.5 * (1.0 + pan)).sqrt())
}
