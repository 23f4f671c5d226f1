//! Phiflame library - phi-octave flame engine
//!
//! Four golden-ratio-spaced sine voices driven by a wall-clock-locked control
//! loop and an hourglass vortex sweep, rendered as a soft-limited stereo bed.

pub mod audio;
pub mod cli;
pub mod control;
pub mod engine;
pub mod error;
pub mod params;
pub mod session;
pub mod status;
pub mod symbols;
pub mod vortex;

pub use engine::{Engine, EngineState};
pub use error::{EngineError, EngineResult};
pub use params::EngineConfig;
pub use status::OutputMode;
