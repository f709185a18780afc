//! Download histories into the data lake without validating them.

use serde_json::json;
use tracing::{error, info};

use tickgate_core::lake;
use tickgate_core::{HistorySource, PipelineConfig, YahooChartSource};

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::{resolve_symbols, CommandResult};

pub async fn run(args: &FetchArgs, config: &PipelineConfig) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.tickers, config)?;
    let source = YahooChartSource::default();

    let mut saved = Vec::new();
    let mut warnings = Vec::new();
    for symbol in &symbols {
        let outcome = match source.fetch_history(symbol).await {
            Ok(history) => lake::write_history(&config.data_lake_dir, &history)
                .map(|path| (history.len(), path))
                .map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };

        match outcome {
            Ok((rows, path)) => {
                info!(symbol = %symbol, rows, path = %path.display(), "history saved");
                saved.push(json!({
                    "symbol": symbol,
                    "rows": rows,
                    "path": path,
                }));
            }
            Err(message) => {
                error!(symbol = %symbol, error = %message, "fetch failed");
                warnings.push(format!("{symbol}: {message}"));
            }
        }
    }

    Ok(CommandResult::ok(
        "fetch",
        json!({
            "data_lake_dir": config.data_lake_dir,
            "saved": saved,
        }),
    )
    .with_warnings(warnings))
}
