//! Real-time synthesis: shared voice parameters, block renderer and output
//! backends.
//!
//! The renderer runs on the host audio thread and only touches the shared
//! parameter block through short copy-in/copy-out critical sections.

mod backend;
mod device;
mod recorder;
mod render;
mod shared;
mod voices;

// Re-export public types
pub use backend::{AudioBackend, NullBackend, StreamFormat};
pub use device::CpalBackend;
pub use recorder::{record_offline, RecordingSummary, OFFLINE_BLOCK_FRAMES};
pub use render::{soft_limit, wrap_phase, RenderEngine, OUTPUT_CEILING};
pub use shared::{ParameterBlock, SharedParameterState};
pub use voices::{constant_power, OctaveFrequencySet, PanLaw, PHI};
