//! Error type shared by the library.

use thiserror::Error;

/// Root error type for engine failures.
///
/// Device and session problems that the engine can degrade around never
/// surface here; they are logged and absorbed.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Session resource could not be turned into a sequence.
    #[error("session error: {0}")]
    Session(String),

    /// Audio output device could not be opened or started.
    #[error("audio device error: {0}")]
    Device(String),

    /// Offline WAV rendering failed.
    #[error("recording error: {0}")]
    Recording(String),

    /// Lifecycle operation called from the wrong state.
    #[error("engine state error: {0}")]
    State(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
