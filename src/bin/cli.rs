//! LiveATC Top Feeds CLI
//!
//! Scrapes the top feeds listing and maintains the JSON snapshot served by
//! the web backend.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use top_feeds::{
    error::Result,
    models::Config,
    pipeline::{self, ScrapePipeline, Scheduler},
    storage::{LocalStorage, SnapshotStorage},
};

/// top-feeds - LiveATC Top Feeds Scraper
#[derive(Parser, Debug)]
#[command(
    name = "top-feeds",
    version,
    about = "Scrape the LiveATC top feeds into a JSON snapshot"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Output JSON file path (overrides output.path)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape once and exit
    Once {
        /// Save the fetched page markup for inspection
        #[arg(long)]
        dump_html: Option<PathBuf>,
    },

    /// Scrape on a schedule until interrupted
    Run {
        /// Scrape interval in minutes (default: schedule.interval_minutes)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Save the fetched page markup for inspection
        #[arg(long)]
        dump_html: Option<PathBuf>,
    },

    /// Write a fixed mock snapshot instead of scraping
    Mock,

    /// Validate the configuration file
    Validate,

    /// Show the current snapshot
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Validate the configuration and log its key settings.
fn report_validation(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");
    log::info!("  page: {}", config.source.page_url);
    log::info!("  output: {}", config.output.path.display());
    log::info!(
        "  link patterns: {}, id params: {}",
        config.extract.link_patterns.len(),
        config.extract.id_params.len()
    );
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => log::warn!("Failed to register SIGTERM handler: {}", e),
        }
    }

    ctrl_c().await;
}

/// Resolves on Ctrl-C. A listener that cannot be installed never resolves.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Some(path) = cli.output {
        config.output.path = path;
    }

    if !matches!(cli.command, Command::Validate) {
        config.validate()?;
    }

    let storage = Arc::new(LocalStorage::new(&config.output.path));

    match cli.command {
        Command::Validate => report_validation(&config)?,

        Command::Once { dump_html } => {
            if dump_html.is_some() {
                config.output.dump_html = dump_html;
            }
            let scrape = ScrapePipeline::with_http(&config, storage)?;
            let summary = scrape.run_once().await?;
            log::info!(
                "Scrape complete: {} of {} feeds written to {}",
                summary.written.feed_count,
                summary.extracted,
                summary.written.location
            );
        }

        Command::Run {
            interval,
            dump_html,
        } => {
            if let Some(minutes) = interval {
                config.schedule.interval_minutes = minutes;
            }
            if dump_html.is_some() {
                config.output.dump_html = dump_html;
            }

            let (handle, signal) = pipeline::stop_channel();
            tokio::spawn(async move {
                shutdown_signal().await;
                log::info!("Shutting down...");
                handle.stop();

                shutdown_signal().await;
                log::warn!("Second shutdown signal, exiting immediately");
                std::process::exit(130);
            });

            let scrape = ScrapePipeline::with_http(&config, storage)?;
            Scheduler::new(scrape, &config.schedule).run(signal).await;
        }

        Command::Mock => {
            pipeline::run_mock(storage.as_ref()).await?;
        }

        Command::Info => {
            log::info!("Snapshot path: {}", storage.path().display());
            match storage.load_snapshot().await? {
                Some(snapshot) => {
                    log::info!("Last updated: {}", snapshot.updated_at.to_rfc3339());
                    for entry in &snapshot.feeds {
                        log::info!(
                            "  #{}: {} [{}] ({} listeners)",
                            entry.rank,
                            entry.feed.name,
                            entry.feed.feed_id,
                            entry.feed.listener_count
                        );
                    }
                }
                None => log::info!("No snapshot found yet."),
            }
        }
    }

    Ok(())
}
