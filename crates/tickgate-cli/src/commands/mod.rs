mod daily_update;
mod export;
mod fetch;
mod reset;
mod validate;

use serde_json::Value;
use time::macros::format_description;
use time::Date;

use tickgate_core::domain::timestamp::local_today;
use tickgate_core::{PipelineConfig, Symbol};
use tickgate_warehouse::{Warehouse, WarehouseConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[derive(Debug)]
pub struct CommandResult {
    pub command: &'static str,
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(command: &'static str, data: Value) -> Self {
        Self {
            command,
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub async fn run(cli: &Cli, config: &PipelineConfig) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Fetch(args) => fetch::run(args, config).await,
        Command::Validate(args) => validate::run(args),
        Command::DailyUpdate(args) => daily_update::run(args, config, cli).await,
        Command::Export(args) => export::run(args, config, cli),
        Command::Reset(args) => reset::run(args, config, cli),
    }
}

/// Explicit `--tickers` win over the configured list.
fn resolve_symbols(overrides: &[String], config: &PipelineConfig) -> Result<Vec<Symbol>, CliError> {
    if overrides.is_empty() {
        return Ok(config.symbols()?);
    }
    overrides
        .iter()
        .map(|ticker| Symbol::parse(ticker).map_err(CliError::from))
        .collect()
}

fn open_warehouse(cli: &Cli) -> Result<Warehouse, CliError> {
    let config = match &cli.db {
        Some(path) => WarehouseConfig::at_path(path),
        None => WarehouseConfig::default(),
    };
    Warehouse::open(config).map_err(CliError::command)
}

/// `YYYY-MM-DD`, or today on the local clock when absent.
fn parse_day(input: Option<&str>) -> Result<Date, CliError> {
    match input {
        Some(text) => Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).map_err(
            |_| CliError::Validation(tickgate_core::ValidationError::InvalidDate(text.to_string())),
        ),
        None => Ok(local_today()),
    }
}
