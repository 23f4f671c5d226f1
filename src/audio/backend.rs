//! Audio output backend interface and the null implementation.

use super::render::RenderEngine;
use crate::error::EngineResult;

/// Negotiated output stream format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate_hz: u32,
    pub channels: u16,
}

/// Audio output device abstraction
///
/// Selected once at startup. `open` validates the device and negotiates a
/// format, `start` hands the renderer to the device callback, `stop` halts and
/// releases the device.
pub trait AudioBackend {
    fn name(&self) -> &str;

    /// Whether this backend drives a real output device
    fn is_available(&self) -> bool;

    fn open(&mut self, requested_sample_rate_hz: u32) -> EngineResult<StreamFormat>;

    fn start(&mut self, renderer: RenderEngine) -> EngineResult<()>;

    fn stop(&mut self);
}

/// Backend with no device; used for timing-only operation
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn open(&mut self, requested_sample_rate_hz: u32) -> EngineResult<StreamFormat> {
        Ok(StreamFormat {
            sample_rate_hz: requested_sample_rate_hz,
            channels: 2,
        })
    }

    fn start(&mut self, _renderer: RenderEngine) -> EngineResult<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}
