//! Mutex-guarded parameter block shared by the control and render contexts.
//!
//! Every access copies in or out under the lock; no reference to the block
//! escapes a critical section.

use std::sync::{Mutex, MutexGuard};

use super::voices::{OctaveFrequencySet, PanLaw};
use crate::params::VOICE_COUNT;

/// Plain-data snapshot of all voices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBlock {
    /// Voice frequencies (Hz), fixed after construction
    pub frequencies: [f64; VOICE_COUNT],

    /// Smoothed amplitudes, written by the render context
    pub amplitudes: [f64; VOICE_COUNT],

    /// Target amplitudes, written by the control loop
    pub target_amplitudes: [f64; VOICE_COUNT],

    /// Oscillator phases in [0, 2π), written by the render context
    pub phases: [f64; VOICE_COUNT],

    pub pan_left: [f64; VOICE_COUNT],
    pub pan_right: [f64; VOICE_COUNT],
}

/// Shared voice parameters
#[derive(Debug)]
pub struct SharedParameterState {
    block: Mutex<ParameterBlock>,
}

impl SharedParameterState {
    pub fn new(frequencies: OctaveFrequencySet, pans: PanLaw) -> Self {
        Self {
            block: Mutex::new(ParameterBlock {
                frequencies: frequencies.as_array(),
                amplitudes: [0.0; VOICE_COUNT],
                target_amplitudes: [0.0; VOICE_COUNT],
                phases: [0.0; VOICE_COUNT],
                pan_left: pans.left,
                pan_right: pans.right,
            }),
        }
    }

    /// Copy of the whole block
    pub fn snapshot(&self) -> ParameterBlock {
        *self.lock()
    }

    /// Replace target amplitudes (control loop side)
    ///
    /// Values are clamped into [0, 1]; non-finite values become 0.
    pub fn publish_targets(&self, targets: [f64; VOICE_COUNT]) {
        let targets = targets.map(sanitize_amplitude);
        self.lock().target_amplitudes = targets;
    }

    /// Write back smoothed amplitudes and advanced phases (render side)
    pub fn commit_voices(&self, amplitudes: [f64; VOICE_COUNT], phases: [f64; VOICE_COUNT]) {
        let mut block = self.lock();
        block.amplitudes = amplitudes;
        block.phases = phases;
    }

    // The block is plain data, so a poisoned lock still holds a usable value.
    fn lock(&self) -> MutexGuard<'_, ParameterBlock> {
        self.block
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub(crate) fn sanitize_amplitude(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
