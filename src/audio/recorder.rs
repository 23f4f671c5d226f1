//! Offline rendering to a WAV file.
//!
//! Drives the control loop and renderer with a virtual clock derived from
//! rendered frames, so the output matches what a device would have played
//! with perfect scheduling.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::render::RenderEngine;
use super::shared::SharedParameterState;
use super::voices::{OctaveFrequencySet, PanLaw};
use crate::control::ControlLoop;
use crate::error::{EngineError, EngineResult};
use crate::params::EngineConfig;
use crate::session::SymbolicSequence;
use crate::status::{OutputMode, StatusSink};
use crate::vortex::VortexPositionModel;

/// Frames rendered per virtual audio callback
pub const OFFLINE_BLOCK_FRAMES: usize = 512;

/// Result of an offline render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingSummary {
    pub frames: u64,
    pub final_tick: u64,
    /// Largest absolute sample written
    pub peak: f32,
}

/// Render `duration_s` seconds of stereo output into a 32-bit float WAV
pub fn record_offline(
    config: &EngineConfig,
    session: SymbolicSequence,
    duration_s: f64,
    path: &Path,
    sink: Box<dyn StatusSink>,
) -> EngineResult<RecordingSummary> {
    config.validate()?;
    if !(duration_s.is_finite() && duration_s > 0.0) {
        return Err(EngineError::Recording(format!(
            "duration must be finite and > 0, got {}",
            duration_s
        )));
    }

    let sample_rate_hz = config.audio.sample_rate_hz;
    let shared = Arc::new(SharedParameterState::new(
        OctaveFrequencySet::from_top(config.audio.top_frequency_hz),
        PanLaw::new(&config.audio.pan_positions),
    ));
    let mut control = ControlLoop::new(
        config.control.clone(),
        VortexPositionModel::new(config.vortex),
        session,
        Arc::clone(&shared),
        sink,
        OutputMode::Device,
    );
    let mut renderer = RenderEngine::new(Arc::clone(&shared), &config.audio, sample_rate_hz);

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate_hz,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        EngineError::Recording(format!("failed to create {}: {}", path.display(), e))
    })?;

    let total_frames = (duration_s * f64::from(sample_rate_hz)).round() as u64;
    let mut buffer = vec![0.0f32; OFFLINE_BLOCK_FRAMES * 2];
    let mut frames_done = 0u64;
    let mut final_tick = 0;
    let mut peak = 0.0f32;

    while frames_done < total_frames {
        let elapsed_s = frames_done as f64 / f64::from(sample_rate_hz);
        final_tick = control.step(elapsed_s).tick;

        let frames = (total_frames - frames_done).min(OFFLINE_BLOCK_FRAMES as u64) as usize;
        let block = &mut buffer[..frames * 2];
        renderer.process_interleaved(block, 2);

        for &sample in block.iter() {
            peak = peak.max(sample.abs());
            writer
                .write_sample(sample)
                .map_err(|e| EngineError::Recording(format!("failed to write sample: {}", e)))?;
        }
        frames_done += frames as u64;
    }

    writer
        .finalize()
        .map_err(|e| EngineError::Recording(format!("failed to finalize WAV: {}", e)))?;

    info!(
        "Rendered {:.2}s ({} frames) to {}",
        duration_s,
        frames_done,
        path.display()
    );

    Ok(RecordingSummary {
        frames: frames_done,
        final_tick,
        peak,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusRecord;

    struct NullSink;

    impl StatusSink for NullSink {
        fn report(&mut self, _record: &StatusRecord) {}
    }

    #[test]
    fn test_record_offline_writes_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let session = SymbolicSequence::from_text("T0F:").unwrap();

        let summary = record_offline(
            &EngineConfig::default(),
            session,
            0.5,
            &path,
            Box::new(NullSink),
        )
        .unwrap();

        assert_eq!(summary.frames, 22_050);
        assert!(summary.peak > 0.0 && summary.peak < 1.0);

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.sample_format, hound::SampleFormat::Float);

        let samples: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 44_100);
        assert!(samples.iter().all(|s| s.abs() < 1.0));
    }

    #[test]
    fn test_record_offline_rejects_bad_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let result = record_offline(
            &EngineConfig::default(),
            SymbolicSequence::fallback(),
            0.0,
            &path,
            Box::new(NullSink),
        );
        assert!(matches!(result, Err(EngineError::Recording(_))));
    }
}
