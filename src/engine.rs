//! Engine lifecycle: device selection, control thread, orderly shutdown.
//!
//! ```text
//! Stopped → Starting → Running(Device) | Running(TimingOnly) → Stopping → Stopped
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::audio::{
    AudioBackend, NullBackend, OctaveFrequencySet, PanLaw, RenderEngine, SharedParameterState,
};
use crate::control::{ControlLoop, MonotonicClock};
use crate::error::{EngineError, EngineResult};
use crate::params::EngineConfig;
use crate::session::SymbolicSequence;
use crate::status::{OutputMode, StatusSink};
use crate::vortex::VortexPositionModel;

/// Granularity of `wait_for_shutdown`
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Starting,
    Running(OutputMode),
    Stopping,
}

/// Flame engine: owns the backend, shared state and control thread
pub struct Engine {
    config: EngineConfig,
    backend: Box<dyn AudioBackend>,
    state: EngineState,
    shared: Option<Arc<SharedParameterState>>,
    control: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl Engine {
    /// Create a stopped engine; the configuration is validated here
    pub fn new(config: EngineConfig, backend: Box<dyn AudioBackend>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            state: EngineState::Stopped,
            shared: None,
            control: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Name of the backend currently in use
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Flag that requests shutdown when set (e.g. from a signal handler)
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Shared voice parameters, present while running
    pub fn shared(&self) -> Option<Arc<SharedParameterState>> {
        self.shared.clone()
    }

    /// Open the device, start rendering and spawn the control loop
    ///
    /// A device that cannot be opened or started is replaced by the null
    /// backend and the engine runs timing-only; that is not an error.
    pub fn start(
        &mut self,
        session: SymbolicSequence,
        mut sink: Box<dyn StatusSink>,
    ) -> EngineResult<OutputMode> {
        if self.state != EngineState::Stopped {
            return Err(EngineError::State(format!(
                "start requires Stopped, engine is {:?}",
                self.state
            )));
        }
        self.state = EngineState::Starting;
        self.shutdown.store(false, Ordering::Release);

        let audio = &self.config.audio;
        let frequencies = OctaveFrequencySet::from_top(audio.top_frequency_hz);
        let shared = Arc::new(SharedParameterState::new(
            frequencies,
            PanLaw::new(&audio.pan_positions),
        ));
        let freqs = frequencies.as_array();
        info!(
            "Voices: {:.1} / {:.1} / {:.1} / {:.1} Hz",
            freqs[0], freqs[1], freqs[2], freqs[3]
        );

        let mode = match self.start_backend(&shared) {
            Ok(()) if self.backend.is_available() => OutputMode::Device,
            Ok(()) => {
                sink.degraded("no audio output device configured");
                OutputMode::TimingOnly
            }
            Err(e) => {
                warn!("{} backend unavailable: {}", self.backend.name(), e);
                self.backend.stop();
                self.backend = Box::new(NullBackend);
                sink.degraded(&e.to_string());
                OutputMode::TimingOnly
            }
        };

        let control = ControlLoop::new(
            self.config.control.clone(),
            VortexPositionModel::new(self.config.vortex),
            session,
            Arc::clone(&shared),
            sink,
            mode,
        );
        let handle = match control.spawn(MonotonicClock::start_now(), Arc::clone(&self.shutdown))
        {
            Ok(handle) => handle,
            Err(e) => {
                self.backend.stop();
                self.state = EngineState::Stopped;
                return Err(EngineError::State(format!(
                    "failed to spawn control thread: {}",
                    e
                )));
            }
        };

        self.shared = Some(shared);
        self.control = Some(handle);
        self.state = EngineState::Running(mode);
        info!("Engine running ({:?})", mode);
        Ok(mode)
    }

    fn start_backend(&mut self, shared: &Arc<SharedParameterState>) -> EngineResult<()> {
        let format = self.backend.open(self.config.audio.sample_rate_hz)?;
        let renderer =
            RenderEngine::new(Arc::clone(shared), &self.config.audio, format.sample_rate_hz);
        self.backend.start(renderer)
    }

    /// Block until the shutdown flag is set
    pub fn wait_for_shutdown(&self) {
        while !self.shutdown.load(Ordering::Acquire) {
            thread::sleep(SHUTDOWN_POLL);
        }
    }

    /// Halt the device, stop the control loop and release everything
    ///
    /// Idempotent; always leaves the engine `Stopped`.
    pub fn stop(&mut self) -> EngineResult<()> {
        if self.state == EngineState::Stopped {
            return Ok(());
        }
        self.state = EngineState::Stopping;
        self.shutdown.store(true, Ordering::Release);

        self.backend.stop();

        let joined = match self.control.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        };
        self.shared = None;
        self.state = EngineState::Stopped;
        info!("Engine stopped");

        joined.map_err(|_| EngineError::State("control thread panicked".to_string()))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Engine shutdown: {}", e);
        }
    }
}
