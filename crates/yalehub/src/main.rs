mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use yalehub_core::Coordinator;

use crate::cli::{Cli, Command, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.log_format);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need credentials
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Status => {
            let (profile, panel) = config::build_panel_config(&cli.global)?;
            tracing::debug!(%profile, "running status");
            let coordinator = Coordinator::new(panel);
            commands::status::handle(&coordinator, &profile, &cli.global).await
        }

        Command::Watch(args) => {
            let (profile, panel) = config::build_panel_config(&cli.global)?;
            tracing::debug!(%profile, "starting watch");
            commands::watch::handle(panel, args, &profile, &cli.global).await
        }
    }
}
