//! cpal output device backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, SupportedBufferSize};
use tracing::{error, info, warn};

use super::backend::{AudioBackend, StreamFormat};
use super::render::RenderEngine;
use crate::error::{EngineError, EngineResult};

/// Upper bound on scratch frames reserved from the device's buffer range
const MAX_RESERVED_FRAMES: usize = 16_384;

/// Default host output device, 32-bit float samples
#[derive(Default)]
pub struct CpalBackend {
    /// Opened device and its negotiated config
    device: Option<(cpal::Device, StreamConfig)>,

    /// Largest block the device may request, when it reports one
    max_buffer_frames: Option<u32>,

    /// Audio output stream (kept alive while running)
    stream: Option<cpal::Stream>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn is_available(&self) -> bool {
        self.device.is_some()
    }

    fn open(&mut self, requested_sample_rate_hz: u32) -> EngineResult<StreamFormat> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::Device("no audio output device found".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::Device(format!("failed to get audio config: {}", e)))?;

        let sample_format = supported.sample_format();
        if sample_format != SampleFormat::F32 {
            return Err(EngineError::Device(format!(
                "unsupported sample format {:?}, need f32",
                sample_format
            )));
        }

        self.max_buffer_frames = match supported.buffer_size() {
            SupportedBufferSize::Range { max, .. } => Some(*max),
            SupportedBufferSize::Unknown => None,
        };
        let mut config: StreamConfig = supported.into();

        // Prefer the requested rate when the device supports it
        if requested_sample_rate_hz != config.sample_rate.0 {
            match device.supported_output_configs() {
                Ok(mut ranges) => {
                    if let Some(range) = ranges.find(|r| {
                        r.channels() == config.channels
                            && r.sample_format() == sample_format
                            && r.min_sample_rate().0 <= requested_sample_rate_hz
                            && requested_sample_rate_hz <= r.max_sample_rate().0
                    }) {
                        config = range
                            .with_sample_rate(SampleRate(requested_sample_rate_hz))
                            .config();
                    } else {
                        warn!(
                            "Sample rate {} Hz not supported, using {} Hz",
                            requested_sample_rate_hz, config.sample_rate.0
                        );
                    }
                }
                Err(e) => {
                    warn!("Could not query supported output configs ({}); using default", e);
                }
            }
        }

        info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate.0,
            config.channels
        );

        let format = StreamFormat {
            sample_rate_hz: config.sample_rate.0,
            channels: config.channels,
        };
        self.device = Some((device, config));
        Ok(format)
    }

    fn start(&mut self, mut renderer: RenderEngine) -> EngineResult<()> {
        let (device, config) = self
            .device
            .as_ref()
            .ok_or_else(|| EngineError::Device("start called before open".to_string()))?;

        if let Some(frames) = self.max_buffer_frames {
            renderer.reserve_frames((frames as usize).min(MAX_RESERVED_FRAMES));
        }

        let channels = config.channels as usize;
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    renderer.process_interleaved(data, channels);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| EngineError::Device(format!("failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| EngineError::Device(format!("failed to start audio stream: {}", e)))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause audio stream: {}", e);
            }
            info!("Audio stream stopped");
        }
        self.device = None;
        self.max_buffer_frames = None;
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        self.stop();
    }
}
