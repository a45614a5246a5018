//! # Vellum Host
//!
//! Headless replay binary for the Vellum editing core.

use std::io::{self, BufWriter};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vellum_host::{CliArgs, HostApp, HostConfig};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the event report.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,vellum_core=debug,vellum_host=debug".into());
    let json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|format| format == "json");
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    tracing::info!("Starting Vellum host");

    let args = CliArgs::parse();
    let config = HostConfig::from(args);
    tracing::info!(
        "Viewport {}x{}, {} clock",
        config.width,
        config.height,
        if config.realtime { "real-time" } else { "virtual" }
    );

    let editor_config = config.editor_config()?;
    let document = config.document()?;
    let script = config.script()?;

    let stdout = io::stdout();
    let mut app = HostApp::new(&config, editor_config, document, BufWriter::new(stdout.lock()))?;
    if config.realtime {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(app.run_realtime(&script))?;
    } else {
        app.run_virtual(&script)?;
    }

    tracing::info!("Vellum host exited after {} events", app.emitted());
    Ok(())
}
