//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::error::EngineResult;
use crate::params::EngineConfig;

/// Default session resource, relative to the working directory
pub const DEFAULT_SESSION_FILE: &str = "omega_session_omega.txt";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "phiflame")]
#[command(about = "Phi-octave flame engine: four golden-ratio voices on a vortex sweep", long_about = None)]
pub struct Args {
    /// Session symbol file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SESSION_FILE)]
    pub session: PathBuf,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output sample rate override (Hz)
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Top voice frequency override (Hz)
    #[arg(long, value_name = "HZ")]
    pub top_hz: Option<f64>,

    /// Soft limiter drive override
    #[arg(long, value_name = "GAIN")]
    pub gain: Option<f64>,

    /// Run the control loop and telemetry without opening an audio device
    #[arg(long)]
    pub no_audio: bool,

    /// Render offline to a WAV file instead of playing
    #[arg(long, value_name = "PATH")]
    pub render: Option<PathBuf>,

    /// Offline render duration (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "10")]
    pub duration: f64,

    /// Print the vortex radius/gain profile and exit
    #[arg(long)]
    pub vortex_grid: bool,
}

impl Args {
    /// Build the engine configuration: file (or defaults), then CLI overrides
    pub fn load_config(&self) -> EngineResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(rate) = self.sample_rate {
            config.audio.sample_rate_hz = rate;
        }
        if let Some(top) = self.top_hz {
            config.audio.top_frequency_hz = top;
        }
        if let Some(gain) = self.gain {
            config.audio.global_gain = gain;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["phiflame"]);
        assert_eq!(args.session, PathBuf::from(DEFAULT_SESSION_FILE));
        assert!(!args.no_audio);
        assert_eq!(args.duration, 10.0);
        assert_eq!(args.load_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_overrides_applied() {
        let args = Args::parse_from([
            "phiflame",
            "--sample-rate",
            "48000",
            "--top-hz",
            "1111",
            "--gain",
            "0.5",
            "--no-audio",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.audio.sample_rate_hz, 48000);
        assert_eq!(config.audio.top_frequency_hz, 1111.0);
        assert_eq!(config.audio.global_gain, 0.5);
        assert!(args.no_audio);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from(["phiflame", "--gain=-1"]);
        assert!(args.load_config().is_err());
    }
}
