//! trendinghubs CLI entry point.

mod app;
mod cli;
mod error;

use crate::app::App;
use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trendinghubs_config::Config;

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout only ever carries command output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("trendinghubs=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trendinghubs=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let mut stdout = tokio::io::stdout();
    if let Command::Extract { file } = &cli.command {
        return app::extract(file, config.extract.layout(), &mut stdout).await;
    }
    App::from_config(&config).await?.run(&cli.command, &mut stdout).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!(?cli, "trendinghubs starting");

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "{}", &*err);
            ExitCode::FAILURE
        },
    }
}
