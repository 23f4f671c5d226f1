//! Control loop: wall clock → virtual tick → symbol → voice targets.
//!
//! The tick is always recomputed from elapsed wall-clock time, never
//! incremented by the loop, so the logical event rate stays locked to real
//! time regardless of how fast or unevenly the loop itself runs.

use glam::DVec3;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use crate::audio::SharedParameterState;
use crate::params::{ControlParams, VOICE_COUNT};
use crate::session::SymbolicSequence;
use crate::status::{OutputMode, StatusRecord, StatusSink};
use crate::symbols::{base_amplitude, octave_weights};
use crate::vortex::VortexPositionModel;

/// Floor applied to elapsed time before any division
pub const MIN_ELAPSED_S: f64 = 1e-9;

/// Ceiling on the combined amplitude handed to the voices
pub const MAX_TOTAL_AMPLITUDE: f64 = 0.95;

/// Ceiling on each shaping coefficient
const MAX_SHAPE: f64 = 1.5;

/// Monotonic time source measured from engine start
pub trait Clock: Send {
    fn elapsed(&self) -> Duration;
}

/// `Instant`-backed clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start_now() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Virtual tick at `elapsed_s`: floor(elapsed * target_hz)
pub fn tick_at(elapsed_s: f64, target_hz: f64) -> u64 {
    (elapsed_s.max(MIN_ELAPSED_S) * target_hz).floor() as u64
}

/// Per-voice shaping biased by the normalized vortex height `z ∈ [0, 1]`
///
/// z = 0 favors the deep voice, z = 1 the tip.
pub fn shape_for_z(z: f64) -> [f64; VOICE_COUNT] {
    let z = if z.is_finite() { z.clamp(0.0, 1.0) } else { 0.5 };
    [
        1.0 - 0.3 * z, // octave 0 (deep)
        0.9 - 0.1 * z, // octave 1
        0.7 + 0.1 * z, // octave 2
        0.5 + 0.5 * z, // octave 3 (tip)
    ]
    .map(|s| s.clamp(0.0, MAX_SHAPE))
}

/// Target amplitude for every voice
pub fn target_amplitudes(symbol: char, total_amplitude: f64, z: f64) -> [f64; VOICE_COUNT] {
    let weights = octave_weights(symbol);
    let shape = shape_for_z(z);
    let mut targets = [0.0; VOICE_COUNT];
    for i in 0..VOICE_COUNT {
        targets[i] = total_amplitude * weights[i] * shape[i];
    }
    targets
}

/// First interval boundary strictly after `elapsed_s`
///
/// Computed in one step, so a stall or a tiny interval costs nothing and a
/// stalled loop emits one record rather than a burst.
fn next_deadline(elapsed_s: f64, interval_s: f64) -> f64 {
    let boundary = ((elapsed_s / interval_s).floor() + 1.0) * interval_s;
    if boundary > elapsed_s {
        return boundary;
    }
    // Rounding or absorption left the boundary at or behind elapsed
    let stepped = elapsed_s + interval_s;
    if stepped > elapsed_s {
        stepped
    } else {
        elapsed_s + elapsed_s.abs() * f64::EPSILON
    }
}

/// Everything one control iteration derives from the clock
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFrame {
    pub tick: u64,
    pub elapsed_s: f64,
    pub symbol: char,
    pub base_amplitude: f64,
    pub gain: f64,
    pub total_amplitude: f64,
    pub focus: DVec3,
    pub targets: [f64; VOICE_COUNT],
}

/// Periodic task publishing voice targets into the shared state
pub struct ControlLoop {
    params: ControlParams,
    vortex: VortexPositionModel,
    session: SymbolicSequence,
    shared: Arc<SharedParameterState>,
    sink: Box<dyn StatusSink>,
    mode: OutputMode,
    next_report_s: f64,
}

impl ControlLoop {
    pub fn new(
        params: ControlParams,
        vortex: VortexPositionModel,
        session: SymbolicSequence,
        shared: Arc<SharedParameterState>,
        sink: Box<dyn StatusSink>,
        mode: OutputMode,
    ) -> Self {
        let next_report_s = params.status_interval_s;
        Self {
            params,
            vortex,
            session,
            shared,
            sink,
            mode,
            next_report_s,
        }
    }

    /// Derive the control frame for an elapsed time without side effects
    pub fn evaluate(&self, elapsed_s: f64) -> ControlFrame {
        let elapsed_s = elapsed_s.max(MIN_ELAPSED_S);
        let target_hz = self.params.target_hz;

        let tick = tick_at(elapsed_s, target_hz);
        let symbol = self.session.symbol_at(tick);
        let base = base_amplitude(symbol);

        let z = VortexPositionModel::z_from_tick(tick, target_hz, self.params.sweep_period_s);
        let (focus, gain) = self.vortex.sample_xyz_and_gain(z);

        let total_amplitude = (base * gain).clamp(0.0, MAX_TOTAL_AMPLITUDE);
        let targets = target_amplitudes(symbol, total_amplitude, focus.z);

        ControlFrame {
            tick,
            elapsed_s,
            symbol,
            base_amplitude: base,
            gain,
            total_amplitude,
            focus,
            targets,
        }
    }

    /// Run one iteration: evaluate, publish targets, report if due
    pub fn step(&mut self, elapsed_s: f64) -> ControlFrame {
        let frame = self.evaluate(elapsed_s);
        self.shared.publish_targets(frame.targets);

        if frame.elapsed_s >= self.next_report_s {
            self.report(&frame);
            self.next_report_s = next_deadline(frame.elapsed_s, self.params.status_interval_s);
        }
        frame
    }

    fn report(&mut self, frame: &ControlFrame) {
        let target_hz = self.params.target_hz;
        let tick_rate_hz = frame.tick as f64 / frame.elapsed_s;
        let record = StatusRecord {
            tick: frame.tick,
            elapsed_s: frame.elapsed_s,
            tick_rate_hz,
            drift_percent: (tick_rate_hz - target_hz) / target_hz * 100.0,
            symbol: frame.symbol,
            total_amplitude: frame.total_amplitude,
            focus: frame.focus,
            voice_amplitudes: self.shared.snapshot().amplitudes,
            mode: self.mode,
        };
        self.sink.report(&record);
    }

    /// Iterate at `control_hz` until `shutdown` is set
    ///
    /// The flag is checked at the top of every iteration; each iteration
    /// sleeps whatever remains of its period.
    pub fn run<C: Clock>(mut self, clock: C, shutdown: &AtomicBool) {
        let period = Duration::try_from_secs_f64(1.0 / self.params.control_hz)
            .unwrap_or(Duration::from_millis(1));
        info!(
            "Control loop running: target {:.1} Hz, period {:?}, session len {}",
            self.params.target_hz,
            period,
            self.session.len()
        );

        while !shutdown.load(Ordering::Acquire) {
            let loop_start = Instant::now();
            self.step(clock.elapsed().as_secs_f64());

            if let Some(rest) = period.checked_sub(loop_start.elapsed()) {
                thread::sleep(rest);
            }
        }
        info!("Control loop stopped");
    }

    /// Run on a dedicated thread
    pub fn spawn<C: Clock + 'static>(
        self,
        clock: C,
        shutdown: Arc<AtomicBool>,
    ) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("phiflame-control".to_string())
            .spawn(move || self.run(clock, &shutdown))
    }
}
