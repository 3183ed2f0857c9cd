//! `talent` command-line client.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use talent_cli::{logging, App, Cli, CliConfig};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env();
    logging::init(config.log_format);

    let cli = Cli::parse();

    match run(cli, &config).await {
        Ok(outcome) if outcome.is_failed() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &CliConfig) -> anyhow::Result<talent_cli::Outcome> {
    let app = App::from_config(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = app.run(cli.command, &mut out).await?;
    out.flush()?;

    Ok(outcome)
}
