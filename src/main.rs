// rfid-bridge - feed RFID reader scans into MySQL.

use clap::Parser;
use rfid_bridge::cli::{Cli, Commands, RunCommand};
use rfid_bridge::output;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Some(Commands::Run(cmd)) => {
            cmd.execute(config, cli.quiet).await?;
        }
        Some(Commands::Ports(cmd)) => cmd.execute()?,
        Some(Commands::Config(cmd)) => cmd.execute(config)?,
        None => {
            RunCommand::default().execute(config, cli.quiet).await?;
        }
    }

    Ok(())
}
