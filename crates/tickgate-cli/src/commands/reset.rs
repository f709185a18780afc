//! Delete stored rows so the next daily update starts from scratch.

use serde_json::json;
use tracing::info;

use tickgate_core::PipelineConfig;
use tickgate_warehouse::PriceStoreWriter;

use crate::cli::{Cli, ResetArgs};
use crate::error::CliError;

use super::{open_warehouse, resolve_symbols, CommandResult};

pub fn run(args: &ResetArgs, config: &PipelineConfig, cli: &Cli) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.tickers, config)?;
    let warehouse = open_warehouse(cli)?;

    let mut cleared = Vec::with_capacity(symbols.len());
    let mut total = 0;
    for symbol in &symbols {
        let rows = warehouse
            .clear_symbol(symbol.as_str())
            .map_err(CliError::command)?;
        if rows > 0 {
            info!(symbol = %symbol, rows, "stored rows deleted");
        }
        total += rows;
        cleared.push(json!({ "symbol": symbol, "rows": rows }));
    }

    Ok(CommandResult::ok(
        "reset",
        json!({
            "cleared": cleared,
            "rows": total,
        }),
    ))
}
