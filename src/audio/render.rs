//! Block renderer: four phase-continuous sine voices, panned, smoothed and
//! soft-limited into a stereo bus.

use std::f64::consts::TAU;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

use super::shared::{sanitize_amplitude, SharedParameterState};
use crate::params::{AudioParams, VOICE_COUNT};

/// Largest magnitude written to the output; keeps the bound strict where
/// `tanh` saturates to exactly 1.0.
pub const OUTPUT_CEILING: f32 = 1.0 - f32::EPSILON;

/// Frames the scratch buses hold before the first block arrives
pub const SCRATCH_FRAMES: usize = 4096;

/// Render engine invoked once per host audio block
pub struct RenderEngine {
    shared: Arc<SharedParameterState>,
    sample_rate_hz: f64,
    smoothing_alpha: f64,
    global_gain: f64,

    // Scratch buses, grown on demand and reused across blocks
    left: Vec<f32>,
    right: Vec<f32>,

    #[cfg(test)]
    fail_next_block: bool,
}

impl RenderEngine {
    /// Create a renderer for a negotiated sample rate
    pub fn new(
        shared: Arc<SharedParameterState>,
        params: &AudioParams,
        sample_rate_hz: u32,
    ) -> Self {
        Self {
            shared,
            sample_rate_hz: f64::from(sample_rate_hz.max(1)),
            smoothing_alpha: params.smoothing_alpha.clamp(0.0, 1.0),
            global_gain: params.global_gain,
            left: vec![0.0; SCRATCH_FRAMES],
            right: vec![0.0; SCRATCH_FRAMES],
            #[cfg(test)]
            fail_next_block: false,
        }
    }

    /// Grow the scratch buses ahead of time so the audio callback does not
    /// allocate for blocks up to `frames` long
    pub fn reserve_frames(&mut self, frames: usize) {
        if self.left.len() < frames {
            self.left.resize(frames, 0.0);
            self.right.resize(frames, 0.0);
        }
    }

    /// Fill an interleaved output buffer with `channels` channels
    ///
    /// Left goes to channel 0, right to channel 1, extra channels are silent
    /// and a mono buffer receives the mean of both. A panic while rendering
    /// yields a silent block instead of unwinding into the host.
    pub fn process_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 || out.is_empty() {
            return;
        }
        let frames = out.len() / channels;

        let rendered = panic::catch_unwind(AssertUnwindSafe(|| self.render_block(frames)));
        if rendered.is_err() {
            error!("Render block panicked; emitting silence");
            out.fill(0.0);
            return;
        }

        for (frame, samples) in out.chunks_exact_mut(channels).enumerate() {
            let (l, r) = (self.left[frame], self.right[frame]);
            if channels == 1 {
                samples[0] = 0.5 * (l + r);
                continue;
            }
            samples[0] = l;
            samples[1] = r;
            samples[2..].fill(0.0);
        }
        // Trailing partial frame, if the host ever hands one over
        let tail = frames * channels;
        out[tail..].fill(0.0);
    }

    /// Render `frames` limited stereo samples into the scratch buses
    fn render_block(&mut self, frames: usize) {
        // No samples, no smoothing step
        if frames == 0 {
            return;
        }
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_block) {
            panic!("render failure injected by test");
        }
        // Only hit when the host exceeds what was reserved
        self.reserve_frames(frames);

        // Copy out under the lock, nothing else
        let block = self.shared.snapshot();

        let mut amps = [0.0; VOICE_COUNT];
        let mut phase_inc = [0.0; VOICE_COUNT];
        for i in 0..VOICE_COUNT {
            let current = sanitize_amplitude(block.amplitudes[i]);
            let target = sanitize_amplitude(block.target_amplitudes[i]);
            amps[i] = sanitize_amplitude(current + self.smoothing_alpha * (target - current));
            phase_inc[i] = TAU * block.frequencies[i] / self.sample_rate_hz;
        }

        for n in 0..frames {
            let t = n as f64;
            let mut left = 0.0;
            let mut right = 0.0;
            for i in 0..VOICE_COUNT {
                let sample = amps[i] * (block.phases[i] + phase_inc[i] * t).sin();
                left += sample * block.pan_left[i];
                right += sample * block.pan_right[i];
            }
            self.left[n] = left as f32;
            self.right[n] = right as f32;
        }

        let mut phases = block.phases;
        for i in 0..VOICE_COUNT {
            phases[i] = wrap_phase(phases[i] + phase_inc[i] * frames as f64);
        }

        self.shared.commit_voices(amps, phases);

        for n in 0..frames {
            self.left[n] = soft_limit(self.left[n], self.global_gain);
            self.right[n] = soft_limit(self.right[n], self.global_gain);
        }
    }
}

/// Wrap a phase into [0, 2π)
pub fn wrap_phase(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// `tanh(gain * x)`, strictly inside (-1, 1) for any input
pub fn soft_limit(sample: f32, gain: f64) -> f32 {
    let x = if sample.is_finite() { f64::from(sample) } else { 0.0 };
    let y = (gain * x).tanh() as f32;
    if y.is_finite() {
        y.clamp(-OUTPUT_CEILING, OUTPUT_CEILING)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::voices::{OctaveFrequencySet, PanLaw};

    fn setup(targets: [f64; VOICE_COUNT]) -> (Arc<SharedParameterState>, RenderEngine) {
        let params = AudioParams::default();
        let shared = Arc::new(SharedParameterState::new(
            OctaveFrequencySet::from_top(params.top_frequency_hz),
            PanLaw::new(&params.pan_positions),
        ));
        shared.publish_targets(targets);
        let engine = RenderEngine::new(Arc::clone(&shared), &params, params.sample_rate_hz);
        (shared, engine)
    }

    fn circular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn test_silent_targets_render_silence() {
        let (_, mut engine) = setup([0.0; VOICE_COUNT]);
        let mut out = vec![1.0f32; 512];
        engine.process_interleaved(&mut out, 2);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_smoothing_applied_once_per_block() {
        let (shared, mut engine) = setup([0.5; VOICE_COUNT]);
        let mut out = vec![0.0f32; 256];

        engine.process_interleaved(&mut out, 2);
        let amps = shared.snapshot().amplitudes;
        for a in amps {
            assert!((a - 0.08 * 0.5).abs() < 1e-12);
        }

        engine.process_interleaved(&mut out, 2);
        let expected = 0.04 + 0.08 * (0.5 - 0.04);
        for a in shared.snapshot().amplitudes {
            assert!((a - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_phase_advances_and_wraps() {
        let (shared, mut engine) = setup([0.3; VOICE_COUNT]);
        let frames = 1000;
        let mut out = vec![0.0f32; frames * 2];
        engine.process_interleaved(&mut out, 2);

        let block = shared.snapshot();
        for i in 0..VOICE_COUNT {
            let expected = wrap_phase(TAU * block.frequencies[i] / 44100.0 * frames as f64);
            assert!(circular_distance(block.phases[i], expected) < 1e-9);
            assert!((0.0..TAU).contains(&block.phases[i]));
        }
    }

    #[test]
    fn test_output_bounded() {
        let (_, mut engine) = setup([1.0; VOICE_COUNT]);
        let mut out = vec![0.0f32; 4096];
        for _ in 0..50 {
            engine.process_interleaved(&mut out, 2);
            assert!(out.iter().all(|s| s.abs() < 1.0));
        }
    }

    #[test]
    fn test_soft_limit_strict_bounds() {
        for x in [0.0f32, 0.5, -0.5, 3.0, -3.0, 1e6, -1e6, f32::MAX, f32::MIN] {
            let y = soft_limit(x, 0.8);
            assert!(y > -1.0 && y < 1.0, "x={} y={}", x, y);
        }
        assert_eq!(soft_limit(f32::NAN, 0.8), 0.0);
        assert_eq!(soft_limit(f32::INFINITY, 0.8), 0.0);
        assert!((soft_limit(0.5, 0.8) - (0.4f64.tanh() as f32)).abs() < 1e-7);
    }

    #[test]
    fn test_channel_layouts() {
        let (_, mut engine) = setup([0.6; VOICE_COUNT]);

        let mut quad = vec![1.0f32; 64 * 4];
        engine.process_interleaved(&mut quad, 4);
        for frame in quad.chunks_exact(4) {
            assert_eq!(frame[2], 0.0);
            assert_eq!(frame[3], 0.0);
        }

        let mut mono = vec![0.0f32; 64];
        engine.process_interleaved(&mut mono, 1);
        assert!(mono.iter().any(|&s| s != 0.0));

        // Trailing partial frame is silenced
        let mut odd = vec![1.0f32; 9];
        engine.process_interleaved(&mut odd, 2);
        assert_eq!(odd[8], 0.0);
    }

    #[test]
    fn test_panicking_block_is_silent_and_next_block_renders() {
        let (shared, mut engine) = setup([0.6; VOICE_COUNT]);
        engine.fail_next_block = true;

        let mut out = vec![1.0f32; 256];
        engine.process_interleaved(&mut out, 2);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(shared.snapshot().amplitudes, [0.0; VOICE_COUNT]);

        engine.process_interleaved(&mut out, 2);
        assert!(out.iter().any(|&s| s != 0.0));
        assert!(shared.snapshot().amplitudes.iter().all(|&a| a > 0.0));
    }

    #[test]
    fn test_zero_frame_block_skips_smoothing() {
        let (shared, mut engine) = setup([0.5; VOICE_COUNT]);

        let mut short = vec![1.0f32; 1];
        engine.process_interleaved(&mut short, 2);
        assert_eq!(short[0], 0.0);
        assert_eq!(shared.snapshot().amplitudes, [0.0; VOICE_COUNT]);
        assert_eq!(shared.snapshot().phases, [0.0; VOICE_COUNT]);

        let mut out = vec![0.0f32; 64];
        engine.process_interleaved(&mut out, 2);
        for a in shared.snapshot().amplitudes {
            assert!((a - 0.08 * 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_scratch_presized() {
        let (_, mut engine) = setup([0.2; VOICE_COUNT]);
        assert!(engine.left.len() >= SCRATCH_FRAMES);

        engine.reserve_frames(SCRATCH_FRAMES * 2);
        assert_eq!(engine.left.len(), SCRATCH_FRAMES * 2);
        assert_eq!(engine.right.len(), SCRATCH_FRAMES * 2);

        // Reserving less never shrinks
        engine.reserve_frames(16);
        assert_eq!(engine.left.len(), SCRATCH_FRAMES * 2);
    }

    #[test]
    fn test_wrap_phase() {
        assert_eq!(wrap_phase(0.0), 0.0);
        assert!((wrap_phase(TAU + 1.0) - 1.0).abs() < 1e-12);
        assert!((wrap_phase(-1.0) - (TAU - 1.0)).abs() < 1e-12);
        assert_eq!(wrap_phase(f64::NAN), 0.0);
        assert!(wrap_phase(-1e-300) < TAU);
    }
}
