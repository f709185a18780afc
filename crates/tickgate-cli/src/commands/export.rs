//! Write one day's accepted rows to the export CSV.

use tickgate_core::{export_day, PipelineConfig};

use crate::cli::{Cli, ExportArgs};
use crate::error::CliError;

use super::{open_warehouse, parse_day, CommandResult};

pub fn run(args: &ExportArgs, config: &PipelineConfig, cli: &Cli) -> Result<CommandResult, CliError> {
    let symbols = config.symbols()?;
    let day = parse_day(args.date.as_deref())?;
    let path = args.output.clone().unwrap_or_else(|| config.export_path());

    let warehouse = open_warehouse(cli)?;
    let report = export_day(&warehouse, &symbols, day, &path).map_err(CliError::command)?;

    let warnings = if report.rows == 0 {
        vec![format!("no stored rows for {}", report.date)]
    } else {
        Vec::new()
    };
    Ok(CommandResult::ok("export", serde_json::to_value(&report)?).with_warnings(warnings))
}
