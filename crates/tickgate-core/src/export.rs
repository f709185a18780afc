use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use time::Date;
use tracing::{debug, info};

use tickgate_warehouse::{DailyPriceRecord, PriceStoreReader};

use crate::domain::timestamp::format_date;
use crate::domain::{Column, Symbol};
use crate::quarantine::TICKER_COLUMN;
use crate::ExportError;

pub const NO_DATA_COLUMN: &str = "Info";
pub const NO_DATA_MESSAGE: &str = "No data available for any table";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub path: PathBuf,
    pub date: String,
    pub tickers_with_data: usize,
    pub rows: usize,
}

/// Export every stored row of `date` across `symbols` into one CSV file.
pub fn export_day(
    store: &dyn PriceStoreReader,
    symbols: &[Symbol],
    date: Date,
    path: &Path,
) -> Result<ExportReport, ExportError> {
    let day = format_date(date);
    let mut tables = Vec::new();
    for symbol in symbols {
        let rows = store.rows_for_date(symbol.as_str(), &day)?;
        debug!(symbol = %symbol, rows = rows.len(), "rows for export");
        if !rows.is_empty() {
            tables.push((symbol, rows));
        }
    }

    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }
    let file = File::create(path).map_err(io_error)?;
    write_csv(file, &tables)?;

    let report = ExportReport {
        path: path.to_path_buf(),
        date: day,
        tickers_with_data: tables.len(),
        rows: tables.iter().map(|(_, rows)| rows.len()).sum(),
    };
    info!(
        path = %report.path.display(),
        tickers = report.tickers_with_data,
        rows = report.rows,
        "export written"
    );
    Ok(report)
}

fn write_csv<W: Write>(
    writer: W,
    tables: &[(&Symbol, Vec<DailyPriceRecord>)],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if tables.is_empty() {
        csv_writer.write_record([NO_DATA_COLUMN])?;
        csv_writer.write_record([NO_DATA_MESSAGE])?;
    } else {
        csv_writer.write_record(
            std::iter::once(TICKER_COLUMN).chain(Column::ALL.into_iter().map(Column::name)),
        )?;
        for (symbol, rows) in tables {
            for row in rows {
                csv_writer.write_record([
                    symbol.to_string(),
                    row.date.clone(),
                    row.open.to_string(),
                    row.high.to_string(),
                    row.low.to_string(),
                    row.close.to_string(),
                    row.volume.to_string(),
                    row.dividends.to_string(),
                    row.stock_splits.to_string(),
                    row.date_modification.clone().unwrap_or_default(),
                ])?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tickgate_warehouse::WarehouseError;
    use time::macros::date;

    #[derive(Default)]
    struct MemoryStore {
        rows: BTreeMap<String, Vec<DailyPriceRecord>>,
    }

    impl PriceStoreReader for MemoryStore {
        fn rows_for_date(
            &self,
            symbol: &str,
            date: &str,
        ) -> Result<Vec<DailyPriceRecord>, WarehouseError> {
            Ok(self
                .rows
                .get(symbol)
                .into_iter()
                .flatten()
                .filter(|row| row.date == date)
                .cloned()
                .collect())
        }

        fn symbols(&self) -> Result<Vec<String>, WarehouseError> {
            Ok(self.rows.keys().cloned().collect())
        }
    }

    fn record(date: &str) -> DailyPriceRecord {
        DailyPriceRecord {
            date: date.to_string(),
            open: 10.5,
            high: 11.0,
            low: 10.0,
            close: 10.8,
            volume: 1000,
            dividends: 0.0,
            stock_splits: 0.0,
            date_modification: Some(format!("{date} 18:00:00")),
        }
    }

    fn symbols(tickers: &[&str]) -> Vec<Symbol> {
        tickers
            .iter()
            .map(|ticker| Symbol::parse(ticker).expect("symbol"))
            .collect()
    }

    #[test]
    fn rows_of_the_day_are_exported_with_ticker() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("intraday").join("Today_Data.csv");
        let mut store = MemoryStore::default();
        store
            .rows
            .insert("AI.PA".to_string(), vec![record("2024-03-01"), record("2024-02-29")]);

        let report = export_day(&store, &symbols(&["AI.PA", "OR.PA"]), date!(2024 - 03 - 01), &path)
            .expect("export");

        assert_eq!(report.tickers_with_data, 1);
        assert_eq!(report.rows, 1);
        let text = fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "ticker,Date,Open,High,Low,Close,Volume,Dividends,Stock_Splits,date_modification"
        );
        assert_eq!(lines[1], "AI.PA,2024-03-01,10.5,11,10,10.8,1000,0,0,2024-03-01 18:00:00");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn no_rows_anywhere_writes_the_info_notice() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("Today_Data.csv");

        let report = export_day(&MemoryStore::default(), &symbols(&["AI.PA"]), date!(2024 - 03 - 01), &path)
            .expect("export");

        assert_eq!(report.rows, 0);
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "Info\nNo data available for any table\n"
        );
    }
}
