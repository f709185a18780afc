//! The daily update: every configured ticker, then one quarantine flush.

use std::path::Path;

use serde_json::json;
use time::OffsetDateTime;
use tracing::{error, info};

use tickgate_core::{
    DailyUpdate, HistorySource, LakeSource, PipelineConfig, Quarantine, RowValidator, Symbol,
    ValidationPolicy, YahooChartSource,
};
use tickgate_warehouse::PriceStoreWriter;

use crate::cli::{Cli, DailyUpdateArgs};
use crate::error::CliError;

use super::{open_warehouse, parse_day, resolve_symbols, CommandResult};

pub async fn run(
    args: &DailyUpdateArgs,
    config: &PipelineConfig,
    cli: &Cli,
) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(&args.tickers, config)?;
    let validator = RowValidator::new(ValidationPolicy::as_of(parse_day(args.as_of.as_deref())?));
    let warehouse = open_warehouse(cli)?;
    let run_id = format!("daily-update-{}", OffsetDateTime::now_utc().unix_timestamp());

    if args.offline {
        let source = LakeSource::new(&config.data_lake_dir);
        execute(&source, None, &warehouse, validator, &symbols, config, run_id).await
    } else {
        let source = YahooChartSource::default();
        let lake_dir = Some(config.data_lake_dir.as_path());
        execute(&source, lake_dir, &warehouse, validator, &symbols, config, run_id).await
    }
}

async fn execute(
    source: &dyn HistorySource,
    lake_dir: Option<&Path>,
    store: &dyn PriceStoreWriter,
    validator: RowValidator,
    symbols: &[Symbol],
    config: &PipelineConfig,
    run_id: String,
) -> Result<CommandResult, CliError> {
    let mut update = DailyUpdate::new(source, store, validator, run_id);
    if let Some(dir) = lake_dir {
        update = update.with_lake_dir(dir);
    }

    let mut quarantine = Quarantine::new();
    let summary = update.run(symbols, &mut quarantine).await;

    let mut warnings: Vec<String> = summary
        .skipped
        .iter()
        .map(|issue| format!("{} skipped: {}", issue.symbol, issue.reason))
        .collect();

    let quarantined_rows = match quarantine.flush_to(&config.quarantine_path) {
        Ok(0) => 0,
        Ok(rows) => {
            info!(path = %config.quarantine_path.display(), rows, "quarantine written");
            rows
        }
        Err(err) => {
            error!(error = %err, "quarantine not written");
            warnings.push(format!("quarantine not written: {err}"));
            0
        }
    };

    Ok(CommandResult::ok(
        "daily-update",
        json!({
            "summary": summary,
            "quarantine": {
                "path": config.quarantine_path,
                "rows": quarantined_rows,
            },
        }),
    )
    .with_warnings(warnings))
}
