//! Phiflame - phi-octave flame engine
//!
//! Four golden-ratio voices ride an hourglass vortex sweep, locked to a
//! virtual 8888 Hz tick rail derived from wall-clock time.

use anyhow::Context;
use clap::Parser;
use std::sync::atomic::Ordering;
use tracing::info;
use tracing_subscriber::EnvFilter;

use phiflame::audio::{record_offline, AudioBackend, CpalBackend, NullBackend};
use phiflame::cli::Args;
use phiflame::session::SymbolicSequence;
use phiflame::status::TracingStatusSink;
use phiflame::vortex::VortexPositionModel;
use phiflame::Engine;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config()?;

    if args.vortex_grid {
        print!("{}", VortexPositionModel::new(config.vortex).profile_table());
        return Ok(());
    }

    info!("Phiflame - phi-octave flame engine");
    info!(
        "Target {:.1} Hz (dt={:.9}s), sample rate {} Hz, limiter gain {:.3}",
        config.control.target_hz,
        1.0 / config.control.target_hz,
        config.audio.sample_rate_hz,
        config.audio.global_gain
    );

    let (session, origin) = SymbolicSequence::load(&args.session);
    info!("Session: {:?} (len={})", origin, session.len());

    if let Some(path) = &args.render {
        let summary = record_offline(
            &config,
            session,
            args.duration,
            path,
            Box::new(TracingStatusSink),
        )?;
        info!(
            "Offline render done: {} frames, final tick {}, peak {:.3}",
            summary.frames, summary.final_tick, summary.peak
        );
        return Ok(());
    }

    let backend: Box<dyn AudioBackend> = if args.no_audio {
        Box::new(NullBackend)
    } else {
        Box::new(CpalBackend::new())
    };
    let mut engine = Engine::new(config, backend)?;

    let shutdown = engine.shutdown_handle();
    ctrlc::set_handler(move || shutdown.store(true, Ordering::Release))
        .context("failed to install Ctrl-C handler")?;

    let mode = engine.start(session, Box::new(TracingStatusSink))?;
    info!("Engine live ({:?}). Ctrl+C to stop.", mode);

    engine.wait_for_shutdown();
    info!("Stopping...");
    engine.stop()?;
    info!("Shut down cleanly");
    Ok(())
}
