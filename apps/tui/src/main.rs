mod app;
mod cli;
mod event;
mod terminal;
mod ui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use monsoon_radial_tui::config::{init_app_config, AppConfig};
use monsoon_radial_tui::headless::{run_headless, HeadlessOptions};
use monsoon_radial_tui::loader::spawn_loaders;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = init_app_config()?;

    // Check if we're running in a terminal
    let headless = args.is_headless() || !is_terminal();
    init_tracing(&config, args.debug, headless)?;

    if headless {
        let options = HeadlessOptions {
            json: args.json,
            export_dir: args.export_svg.clone(),
            year: args.year,
        };
        return run_headless(&config, &options).await;
    }

    info!(charts = config.page.charts.len(), "starting terminal UI");
    let loads = spawn_loaders(&config);
    let mut app = App::new(&config);

    // Setup terminal
    let (mut terminal, modes) = terminal::setup()?;

    // Run the application
    let result = event::run(&mut terminal, &mut app, loads);

    // Restore terminal
    terminal::restore(modes);

    result
}

/// Headless runs log to stderr; the interactive UI owns the screen, so it
/// logs to a file instead.
fn init_tracing(config: &AppConfig, debug: bool, headless: bool) -> Result<()> {
    let default_level = match (debug, headless) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .wrap_err_with(|| format!("Failed to open log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
