mod cli;
mod config;
mod error;
mod poll_loop;
pub mod router_api;
mod speech;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};

use crate::cli::Cli;
use crate::config::{Config, LoggingConfig};
use crate::poll_loop::run_poll_loop;
use crate::router_api::router_client::RouterClient;
use crate::speech::CommandSpeaker;
use tokio::sync::watch;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) if !path.exists() => {
            println!("Config file not found. Creating example {}...", path.display());
            Config::save_example(path)?;
            println!("Please edit {} with your settings and restart the application.", path.display());
            anyhow::bail!("Config file {} did not exist", path.display());
        }
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?,
        None => Config::default(),
    };

    init_tracing(&config.logging);

    let router = RouterClient::new(
        &cli.request_key,
        &cli.router_ip_address,
        cli.jrd_id,
        config.intervals.request_timeout(),
    )
    .context("Unable to set up the router client")?;
    let speaker = CommandSpeaker::from_config(&config.speech, config.intervals.speech_timeout());
    info!("Polling {} every {:?}", router.url(), config.intervals.poll_interval());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, stopping");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("Unable to listen for Ctrl-C: {:?}", e);
                // Keep the sender alive so the loop is not told to stop.
                std::future::pending::<()>().await;
            }
        }
    });

    let mut stdout = std::io::stdout();
    let summary = run_poll_loop(
        &router,
        &speaker,
        config.intervals.poll_interval(),
        shutdown_rx,
        &mut stdout,
    )
    .await
    .inspect_err(|e| error!("Polling stopped: {}", e))?;

    info!(
        polls = summary.polls,
        announcements = summary.announcements,
        "Stopped"
    );
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    // RUST_LOG wins over the configured console level.
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.console_level));

    // Stdout carries the readings, so the console logger goes to stderr.
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layers: Option<Box<dyn Layer<Registry> + Send + Sync>> =
        logging.directory.as_ref().map(|log_dir| {
            // One file per level
            let debug_file = rolling::daily(log_dir, &logging.debug_file);
            let info_file = rolling::daily(log_dir, &logging.info_file);
            let warn_file = rolling::daily(log_dir, &logging.warn_file);
            let error_file = rolling::daily(log_dir, &logging.error_file);

            let debug_layer = fmt::layer()
                .with_writer(debug_file)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug"));

            let info_layer = fmt::layer()
                .with_writer(info_file)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::INFO);

            let warn_layer = fmt::layer()
                .with_writer(warn_file)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

            let error_layer = fmt::layer()
                .with_writer(error_file)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

            debug_layer
                .and_then(info_layer)
                .and_then(warn_layer)
                .and_then(error_layer)
                .boxed()
        });

    tracing_subscriber::registry()
        .with(file_layers)
        .with(console_layer)
        .init();
}
