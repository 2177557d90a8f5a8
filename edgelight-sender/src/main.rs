//! edgelight-sender: entry point.
//!
//! ```text
//! edgelight-sender                  Run with edgelight.toml (created if missing)
//! edgelight-sender --config <path>  Load a custom config TOML
//! edgelight-sender --gen-config     Write default config to stdout
//! edgelight-sender --host 10.0.0.7 --port 7777 --fps 30
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use edgelight_sender::config::{ConfigOrigin, SenderConfig};
use edgelight_sender::service::SenderService;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "edgelight-sender", about = "Stream screen-edge colors to a UDP LED controller")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "edgelight.toml")]
    config: PathBuf,

    /// Controller host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Controller UDP port (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Target frames per second (overrides config).
    #[arg(long)]
    fps: Option<u32>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&SenderConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config, then apply CLI overrides.
    let (mut config, origin) = SenderConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.network.remote_host = host;
    }
    if let Some(port) = cli.port {
        config.network.remote_port = port;
    }
    if let Some(fps) = cli.fps {
        config.pacing.target_fps = fps;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("edgelight-sender v{}", env!("CARGO_PKG_VERSION"));
    match origin {
        ConfigOrigin::File => info!("config: {}", cli.config.display()),
        ConfigOrigin::CreatedDefault { write_error: None } => {
            info!("no config at {}; wrote defaults", cli.config.display());
        }
        ConfigOrigin::CreatedDefault {
            write_error: Some(e),
        } => warn!("no config at {}; using defaults (write failed: {e})", cli.config.display()),
        ConfigOrigin::Invalid(e) => {
            warn!("invalid config {}: {e}; using defaults", cli.config.display());
        }
    }

    let pipeline = config.to_pipeline_config();
    info!(
        "controller: {}:{}",
        config.network.remote_host, config.network.remote_port
    );
    info!("LEDs: {}", pipeline.layout.total_leds());
    info!("target FPS: {}", pipeline.target_fps);

    let service = SenderService::new(config);
    let stop = service.stop_handle();

    // Ctrl-C handler.
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received, shutting down");
        stop.stop();
    });

    if let Err(e) = service.run().await {
        error!("sender stopped: {e}");
        return Err(e.into());
    }

    Ok(())
}
