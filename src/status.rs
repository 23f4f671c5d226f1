//! Status telemetry records and sinks.

use glam::DVec3;
use tracing::{info, warn};

use crate::params::VOICE_COUNT;

/// How the engine is producing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Rendering to an output device
    Device,
    /// No device; control loop and telemetry only
    TimingOnly,
}

/// One status report, emitted once per status interval
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub tick: u64,
    pub elapsed_s: f64,

    /// Measured tick rate: tick / elapsed (Hz)
    pub tick_rate_hz: f64,

    /// Deviation of the measured rate from the nominal target (percent)
    pub drift_percent: f64,

    pub symbol: char,
    pub total_amplitude: f64,

    /// Vortex focus vector, each component in [0, 1]
    pub focus: DVec3,

    /// Smoothed amplitudes last written by the renderer
    pub voice_amplitudes: [f64; VOICE_COUNT],

    pub mode: OutputMode,
}

/// Consumer of status telemetry
pub trait StatusSink: Send {
    fn report(&mut self, record: &StatusRecord);

    /// Called once when the engine degrades to timing-only output
    fn degraded(&mut self, _reason: &str) {}
}

/// Sink writing structured status lines through `tracing`
#[derive(Debug, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn report(&mut self, record: &StatusRecord) {
        info!(
            tick = record.tick,
            t = %format!("{:.3}s", record.elapsed_s),
            actual = %format!("{:.3}Hz", record.tick_rate_hz),
            drift = %format!("{:.3}%", record.drift_percent),
            "status"
        );
        let tag = match record.mode {
            OutputMode::Device => "",
            OutputMode::TimingOnly => " [TIMING ONLY]",
        };
        info!(
            tick = record.tick,
            symbol = %record.symbol,
            amp = %format!("{:.3}", record.total_amplitude),
            xyz = %format!(
                "({:.3},{:.3},{:.3})",
                record.focus.x, record.focus.y, record.focus.z
            ),
            voices = ?record.voice_amplitudes,
            "audio{}",
            tag
        );
    }

    fn degraded(&mut self, reason: &str) {
        warn!("Audio disabled, timing only: {}", reason);
    }
}
