//! One daily-update run over a list of tickers.
//!
//! Each ticker is fetched, persisted to the data lake, validated and routed:
//! accepted rows go to the store, range rejections go to the quarantine, and
//! everything else skips the ticker. No ticker failure aborts the run.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info, warn};

use tickgate_warehouse::{IngestLogEntry, IngestStatus, PriceStoreWriter};

use crate::domain::Symbol;
use crate::lake;
use crate::quarantine::Quarantine;
use crate::source::HistorySource;
use crate::validator::{Outcome, RejectionKind, RowValidator, ValidationReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerIssue {
    pub symbol: String,
    pub reason: String,
}

/// Per-ticker routing of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub accepted: Vec<String>,
    pub quarantined: Vec<TickerIssue>,
    pub skipped: Vec<TickerIssue>,
}

impl RunSummary {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    pub fn processed(&self) -> usize {
        self.accepted.len() + self.quarantined.len() + self.skipped.len()
    }
}

pub struct DailyUpdate<'a> {
    source: &'a dyn HistorySource,
    store: &'a dyn PriceStoreWriter,
    validator: RowValidator,
    lake_dir: Option<PathBuf>,
    run_id: String,
}

impl<'a> DailyUpdate<'a> {
    pub fn new(
        source: &'a dyn HistorySource,
        store: &'a dyn PriceStoreWriter,
        validator: RowValidator,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            validator,
            lake_dir: None,
            run_id: run_id.into(),
        }
    }

    /// Persist every fetched history to the data lake before validating it.
    pub fn with_lake_dir(mut self, lake_dir: impl Into<PathBuf>) -> Self {
        self.lake_dir = Some(lake_dir.into());
        self
    }

    /// Process tickers in order, appending rejected rows to `quarantine`.
    pub async fn run(&self, symbols: &[Symbol], quarantine: &mut Quarantine) -> RunSummary {
        let mut summary = RunSummary::new(self.run_id.clone());
        info!(
            run_id = %self.run_id,
            source = self.source.name(),
            tickers = symbols.len(),
            "daily update started"
        );

        for symbol in symbols {
            let (status, detail) = self.process(symbol, quarantine).await;
            match status {
                IngestStatus::Accepted => summary.accepted.push(symbol.to_string()),
                IngestStatus::Quarantined => summary.quarantined.push(issue(symbol, &detail)),
                IngestStatus::Skipped => summary.skipped.push(issue(symbol, &detail)),
            }

            let entry = IngestLogEntry {
                run_id: self.run_id.clone(),
                symbol: symbol.to_string(),
                status,
                detail,
            };
            if status != IngestStatus::Accepted {
                if let Err(err) = self.store.record_outcome(&entry) {
                    warn!(symbol = %symbol, error = %err, "failed to record ingest outcome");
                }
            }
        }

        info!(
            run_id = %self.run_id,
            accepted = summary.accepted.len(),
            quarantined = summary.quarantined.len(),
            skipped = summary.skipped.len(),
            "daily update finished"
        );
        summary
    }

    async fn process(
        &self,
        symbol: &Symbol,
        quarantine: &mut Quarantine,
    ) -> (IngestStatus, Option<String>) {
        let history = match self.source.fetch_history(symbol).await {
            Ok(history) => history,
            Err(err) => {
                error!(symbol = %symbol, error = %err, "history retrieval failed");
                return (IngestStatus::Skipped, Some(err.to_string()));
            }
        };

        if let Some(dir) = &self.lake_dir {
            match lake::write_history(dir, &history) {
                Ok(path) => info!(symbol = %symbol, path = %path.display(), "history saved"),
                Err(err) => warn!(symbol = %symbol, error = %err, "history not saved to lake"),
            }
        }

        let report = match self.validator.validate_latest(&history) {
            Ok(report) => report,
            Err(err) => {
                error!(symbol = %symbol, error = %err, "recast failed");
                return (IngestStatus::Skipped, Some(err.to_string()));
            }
        };
        log_checks(&report);

        match report.outcome {
            Outcome::Accepted(row) => {
                match self.store.write_accepted(&self.run_id, symbol.as_str(), &row.to_record()) {
                    Ok(()) => {
                        info!(symbol = %symbol, date = %row.date, "row inserted");
                        (IngestStatus::Accepted, None)
                    }
                    Err(err) => {
                        error!(symbol = %symbol, error = %err, "insert failed");
                        (IngestStatus::Skipped, Some(err.to_string()))
                    }
                }
            }
            Outcome::Rejected(invalid) => {
                let tags = invalid.type_error();
                let status = match invalid.kind {
                    RejectionKind::Range => {
                        warn!(symbol = %symbol, tags = %tags, "row quarantined");
                        IngestStatus::Quarantined
                    }
                    RejectionKind::Structural | RejectionKind::Shape => {
                        error!(symbol = %symbol, tags = %tags, "row rejected before recast, skipping ticker");
                        IngestStatus::Skipped
                    }
                };
                quarantine.push(invalid);
                (status, Some(tags))
            }
            Outcome::Empty => {
                warn!(symbol = %symbol, "history is empty");
                (IngestStatus::Skipped, Some(String::from("no rows")))
            }
        }
    }
}

/// `'<column>': OK` / `'<column>': NOT OK`, one line per shape check.
pub fn log_checks(report: &ValidationReport) {
    for check in &report.checks {
        if check.is_ok() {
            info!(symbol = %report.symbol, "'{}': OK", check.column);
        } else {
            warn!(symbol = %report.symbol, status = ?check.status, "'{}': NOT OK", check.column);
        }
    }
}

fn issue(symbol: &Symbol, detail: &Option<String>) -> TickerIssue {
    TickerIssue {
        symbol: symbol.to_string(),
        reason: detail.clone().unwrap_or_default(),
    }
}
