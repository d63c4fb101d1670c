mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let rendered = commands::run(&cli, shutdown_signal()).await?;
    output::render(&rendered, cli.format, cli.pretty)?;

    if !rendered.envelope.is_ok() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}

/// Token cancelled on Ctrl+C; every view scope is a child of it.
fn shutdown_signal() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupted, abandoning in-flight requests");
                on_signal.cancel();
            }
            Err(error) => warn!(%error, "cannot listen for Ctrl+C"),
        }
    });
    token
}
