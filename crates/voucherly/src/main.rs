mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voucherly_config::{Config, ConfigSources};
use voucherly_core::VoucherService;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `RUST_LOG` wins, then `-v`, then the configured `log_level`.
fn init_tracing(verbosity: u8, configured: &str) {
    let fallback = match verbosity {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(fallback).unwrap_or_else(|_| EnvFilter::new("info"))
        }))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Config, CliError> {
    let sources = match cli.global.config {
        Some(ref path) => ConfigSources::with_file(path),
        None => ConfigSources::default(),
    };
    Ok(sources.load()?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;
    init_tracing(cli.global.verbose, &settings.log_level);

    match cli.command {
        // Local commands don't need a controller connection
        Command::Config => commands::config_cmd::handle(&settings, &cli.global),
        Command::Types { kiosk } => commands::types::handle(&settings, kiosk, &cli.global),

        cmd => {
            let service = VoucherService::new(settings.to_service_config()?);

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &service, &cli.global).await;
            service.shutdown().await;
            result
        }
    }
}
