// ABOUTME: Main entry point for the imgcat terminal image viewer
// ABOUTME: Parses arguments, configures logging and runs the full-screen viewer

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use imgcat::app::App;
use imgcat::cli::Cli;
use imgcat::cli_output::CliOutput;
use imgcat::config::Settings;
use imgcat::terminal::TerminalGuard;
use imgcat_core::{ExitStatus, ImageSource, Session, SourceFetcher};
use std::fs::File;

#[tokio::main]
async fn main() {
    if std::env::args_os().len() <= 1 {
        // Bare invocation prints usage to stdout and still counts as a failure.
        // Logging is not set up yet and the exit code is 1 regardless, so a
        // failed write is ignored.
        let _ = Cli::command().print_help();
        println!();
        std::process::exit(1);
    }

    let cli = Cli::parse();

    let status = match run(cli).await {
        Ok(status) => status,
        Err(e) => {
            CliOutput::new().report(&e);
            ExitStatus::Failure
        }
    };

    std::process::exit(status.code());
}

async fn run(cli: Cli) -> Result<ExitStatus> {
    let settings = Settings::resolve(&cli)?;
    init_logging(&settings)?;

    log::info!(
        "Starting with {} image(s), color profile {}",
        cli.references.len(),
        settings.profile
    );

    let sources: Vec<ImageSource> = cli.references.iter().map(|r| ImageSource::parse(r)).collect();
    let session = Session::new(sources)?;
    let fetcher = SourceFetcher::new(settings.fetch.clone())?;

    let mut app = App::new(session, fetcher, settings.profile);

    // The guard restores the terminal before any error is printed
    let mut guard = TerminalGuard::enter()?;
    let rows = TerminalGuard::rows()?;
    let status = app.run(guard.writer(), rows).await;
    drop(guard);

    let status = status?;
    log::info!("Exiting with status {}", status.code());
    Ok(status)
}

/// The viewer owns the screen, so logs only go to a file when one is configured
fn init_logging(settings: &Settings) -> Result<()> {
    let mut builder = match &settings.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let mut builder =
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")),
    };

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
    Ok(())
}
