//! # Tickgate Warehouse
//!
//! DuckDB-backed storage for validated daily price snapshots.
//!
//! ## Overview
//!
//! Every ticker gets its own table in the `stocks` schema
//! (`stocks."AI.PA"`, `stocks."MC.PA"`, ...). Accepted rows are appended to
//! that table together with an `ingest_log` audit row; the export side reads
//! back the rows of one calendar day.
//!
//! Writing and reading are two separate capabilities, [`PriceStoreWriter`]
//! and [`PriceStoreReader`]. [`Warehouse`] implements both; callers that only
//! need one side take the trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tickgate_warehouse::{DailyPriceRecord, PriceStoreReader, PriceStoreWriter, Warehouse};
//!
//! fn main() -> Result<(), tickgate_warehouse::WarehouseError> {
//!     let warehouse = Warehouse::open_default()?;
//!
//!     let record = DailyPriceRecord {
//!         date: "2024-03-01".to_string(),
//!         open: 10.5,
//!         high: 11.0,
//!         low: 10.0,
//!         close: 10.8,
//!         volume: 1_000,
//!         dividends: 0.0,
//!         stock_splits: 0.0,
//!         date_modification: Some("2024-03-01 18:00:00".to_string()),
//!     };
//!     warehouse.write_accepted("run-001", "AI.PA", &record)?;
//!
//!     let rows = warehouse.rows_for_date("AI.PA", "2024-03-01")?;
//!     assert_eq!(rows.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Security
//!
//! Values are always bound as query parameters. Ticker symbols become
//! identifiers, so they are checked against a strict character set and quoted
//! before they reach any SQL text.

pub mod duckdb;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{Connection, ToSql};
use serde::Serialize;
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};

const STOCKS_SCHEMA: &str = "stocks";
const MAX_SYMBOL_LEN: usize = 15;

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symbol cannot be used as a table identifier.
    #[error("invalid table symbol '{0}'")]
    InvalidSymbol(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for tickgate data.
    pub tickgate_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let tickgate_home = resolve_tickgate_home();
        let db_path = tickgate_home.join("warehouse.duckdb");
        Self {
            tickgate_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl WarehouseConfig {
    /// Configuration pointing at an explicit database file.
    pub fn at_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }
}

/// One validated daily price row, as stored in a ticker table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPriceRecord {
    /// Trading day as `YYYY-MM-DD`.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub dividends: f64,
    pub stock_splits: f64,
    /// Snapshot timestamp as `YYYY-MM-DD HH:MM:SS`, when the source stamped one.
    pub date_modification: Option<String>,
}

/// What happened to a ticker during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    Accepted,
    Quarantined,
    Skipped,
}

impl IngestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Quarantined => "quarantined",
            Self::Skipped => "skipped",
        }
    }
}

/// Audit entry written to `ingest_log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestLogEntry {
    pub run_id: String,
    pub symbol: String,
    pub status: IngestStatus,
    pub detail: Option<String>,
}

/// Write side of the price store.
pub trait PriceStoreWriter {
    /// Append an accepted row to the ticker's table and log it as accepted.
    fn write_accepted(
        &self,
        run_id: &str,
        symbol: &str,
        record: &DailyPriceRecord,
    ) -> Result<(), WarehouseError>;

    /// Record a non-accepted outcome (quarantined or skipped) for a ticker.
    fn record_outcome(&self, entry: &IngestLogEntry) -> Result<(), WarehouseError>;

    /// Remove every stored row of a ticker, returning how many were deleted.
    fn clear_symbol(&self, symbol: &str) -> Result<usize, WarehouseError>;
}

/// Read side of the price store.
pub trait PriceStoreReader {
    /// Rows whose `Date` equals `date` (`YYYY-MM-DD`), newest snapshot first.
    /// A ticker without a table yields no rows.
    fn rows_for_date(&self, symbol: &str, date: &str)
        -> Result<Vec<DailyPriceRecord>, WarehouseError>;

    /// Tickers that currently have a table, sorted.
    fn symbols(&self) -> Result<Vec<String>, WarehouseError>;
}

/// The main warehouse interface for daily price storage.
#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let warehouse = Self { config, manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Number of `ingest_log` rows recorded for a run.
    pub fn ingest_log_count(&self, run_id: &str) -> Result<i64, WarehouseError> {
        let connection = self.manager.acquire()?;
        let params: [&dyn ToSql; 1] = [&run_id];
        let count = connection.query_row(
            "SELECT COUNT(*) FROM ingest_log WHERE run_id = ?",
            params.as_slice(),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl PriceStoreWriter for Warehouse {
    fn write_accepted(
        &self,
        run_id: &str,
        symbol: &str,
        record: &DailyPriceRecord,
    ) -> Result<(), WarehouseError> {
        let table = price_table(symbol)?;
        let connection = self.manager.acquire()?;
        connection.execute_batch(migrations::price_table_ddl(&table).as_str())?;

        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            // Table name is validated and quoted by `price_table`.
            let insert_sql = format!(
                "INSERT INTO {table} \
                 (\"Date\", \"Open\", \"High\", \"Low\", \"Close\", \"Volume\", \"Dividends\", \"Stock_Splits\", date_modification) \
                 VALUES (CAST(? AS DATE), ?, ?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP))"
            );
            let params: [&dyn ToSql; 9] = [
                &record.date,
                &record.open,
                &record.high,
                &record.low,
                &record.close,
                &record.volume,
                &record.dividends,
                &record.stock_splits,
                &record.date_modification,
            ];
            connection.execute(insert_sql.as_str(), params.as_slice())?;

            insert_log_row(
                &connection,
                &IngestLogEntry {
                    run_id: run_id.to_owned(),
                    symbol: symbol.to_owned(),
                    status: IngestStatus::Accepted,
                    detail: None,
                },
            )
        })();

        finalize_transaction(&connection, result)
    }

    fn record_outcome(&self, entry: &IngestLogEntry) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        insert_log_row(&connection, entry)
    }

    fn clear_symbol(&self, symbol: &str) -> Result<usize, WarehouseError> {
        let table = price_table(symbol)?;
        let connection = self.manager.acquire()?;
        if !table_exists(&connection, symbol)? {
            return Ok(0);
        }
        let deleted = connection.execute(format!("DELETE FROM {table}").as_str(), [])?;
        Ok(deleted)
    }
}

impl PriceStoreReader for Warehouse {
    fn rows_for_date(
        &self,
        symbol: &str,
        date: &str,
    ) -> Result<Vec<DailyPriceRecord>, WarehouseError> {
        let table = price_table(symbol)?;
        let connection = self.manager.acquire()?;
        if !table_exists(&connection, symbol)? {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT CAST(\"Date\" AS VARCHAR), \"Open\", \"High\", \"Low\", \"Close\", \"Volume\", \
             \"Dividends\", \"Stock_Splits\", strftime(date_modification, '%Y-%m-%d %H:%M:%S') \
             FROM {table} WHERE \"Date\" = CAST(? AS DATE) ORDER BY date_modification DESC NULLS LAST"
        );
        let mut statement = connection.prepare(sql.as_str())?;
        let params: [&dyn ToSql; 1] = [&date];
        let rows = statement.query_map(params.as_slice(), |row| {
            Ok(DailyPriceRecord {
                date: row.get(0)?,
                open: row.get(1)?,
                high: row.get(2)?,
                low: row.get(3)?,
                close: row.get(4)?,
                volume: row.get(5)?,
                dividends: row.get(6)?,
                stock_splits: row.get(7)?,
                date_modification: row.get(8)?,
            })
        })?;

        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn symbols(&self) -> Result<Vec<String>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = ? ORDER BY table_name",
        )?;
        let params: [&dyn ToSql; 1] = [&STOCKS_SCHEMA];
        let names = statement
            .query_map(params.as_slice(), |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

/// Validate a ticker symbol and return its quoted table identifier.
///
/// Only ASCII letters, digits, `.`, `-` and `^` are accepted, which keeps the
/// double-quoted identifier free of quote characters.
pub fn price_table(symbol: &str) -> Result<String, WarehouseError> {
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '^'));
    if !valid {
        return Err(WarehouseError::InvalidSymbol(symbol.to_owned()));
    }
    Ok(format!("{STOCKS_SCHEMA}.\"{symbol}\""))
}

fn table_exists(connection: &Connection, symbol: &str) -> Result<bool, WarehouseError> {
    let params: [&dyn ToSql; 2] = [&STOCKS_SCHEMA, &symbol];
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
        params.as_slice(),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn insert_log_row(connection: &Connection, entry: &IngestLogEntry) -> Result<(), WarehouseError> {
    let status = entry.status.as_str();
    let params: [&dyn ToSql; 4] = [&entry.run_id, &entry.symbol, &status, &entry.detail];
    connection.execute(
        "INSERT INTO ingest_log (run_id, symbol, status, detail, timestamp) \
         VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)",
        params.as_slice(),
    )?;
    Ok(())
}

/// Finalize a transaction, committing on success or rolling back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

/// Resolve the tickgate home directory from environment or default.
fn resolve_tickgate_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKGATE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickgate");
    }

    PathBuf::from(".tickgate")
}
