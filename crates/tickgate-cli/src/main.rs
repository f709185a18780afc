mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;

use tickgate_core::PipelineConfig;

use crate::cli::{Cli, Command};
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
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;

    let log_file = match cli.command {
        Command::DailyUpdate(_) => Some(config.daily_log_path()),
        _ => None,
    };
    logging::init(log_file.as_deref())?;

    let result = commands::run(&cli, &config).await?;
    output::render(&result, cli.pretty)?;

    if cli.strict && !result.warnings.is_empty() {
        return Err(CliError::StrictModeViolation {
            warning_count: result.warnings.len(),
        });
    }

    Ok(ExitCode::SUCCESS)
}
