//! `intercfg` — terminal configurator for intercom call panels.
//!
//! Two flows share one navigation stack: the auto-configuration wizard
//! (device type → subtype → devices → switch → port → commit) and the
//! diagnostic menu that edits the panel's intercom, audio, video, network
//! and system settings. Hardware is simulated: port scans and NFC key reads
//! come from seeded generators, so `--seed` reproduces a session.
//!
//! Logs are written to a file (default `/tmp/intercfg.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod context;
mod data_bridge;
mod event;
mod navigation;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::context::Sources;
use crate::screen::ScreenId;

/// Configure and diagnose intercom call panels from the terminal.
#[derive(Parser, Debug)]
#[command(name = "intercfg", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, env = "INTERCFG_CONFIG")]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "/tmp/intercfg.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Seed for the simulated port scanner and NFC reader
    #[arg(long)]
    seed: Option<u64>,

    /// Screen to open first, e.g. `DiagnosticMain`
    #[arg(long)]
    screen: Option<ScreenId>,
}

/// File-based tracing. Nothing may be written to stdout/stderr while the
/// TUI is up. The returned guard flushes the writer on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "intercfg_tui={log_level},intercfg_core={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("intercfg.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config_file = cli.config.clone().unwrap_or_else(intercfg_config::config_path);
    let mut config = intercfg_config::load_config_from(&config_file)?;

    // CLI flags win over file and environment.
    if let Some(seed) = cli.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(screen) = cli.screen {
        config.ui.initial_screen = screen.name().to_owned();
    }

    let (sources, seed) = Sources::simulated(&config.simulation);
    info!(
        config = %config_file.display(),
        seed,
        screen = %config.ui.initial_screen,
        "starting intercfg"
    );

    let mut app = App::new(config, sources)?;
    app.run().await?;

    Ok(())
}
