//! Raw history CSV files, one `<TICKER>_Historical_Data.csv` per ticker.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::{PriceHistory, RawRow, Symbol, MISSING_VALUE};
use crate::LakeError;

pub const HISTORY_FILE_SUFFIX: &str = "_Historical_Data.csv";

pub fn history_file_name(symbol: &Symbol) -> String {
    format!("{symbol}{HISTORY_FILE_SUFFIX}")
}

pub fn history_path(dir: &Path, symbol: &Symbol) -> PathBuf {
    dir.join(history_file_name(symbol))
}

/// Ticker encoded in a lake file name: everything before the first `_`.
pub fn ticker_from_file_name(path: &Path) -> Result<Symbol, LakeError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let ticker = name
        .split_once('_')
        .map(|(ticker, _)| ticker)
        .filter(|ticker| !ticker.is_empty())
        .ok_or_else(|| LakeError::UnrecognizedFileName(name.to_string()))?;
    Ok(Symbol::parse(ticker)?)
}

/// Write a history into the lake, replacing any previous file for the ticker.
pub fn write_history(dir: &Path, history: &PriceHistory) -> Result<PathBuf, LakeError> {
    fs::create_dir_all(dir).map_err(|source| LakeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = history_path(dir, &history.symbol);
    let file = File::create(&path).map_err(|source| LakeError::Io {
        path: path.clone(),
        source,
    })?;
    write_csv(file, history).map_err(|source| LakeError::Csv {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn write_csv<W: Write>(writer: W, history: &PriceHistory) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(history.columns())?;
    for row in history.rows() {
        csv_writer.write_record(
            history
                .columns()
                .iter()
                .map(|name| row.get(name).unwrap_or(MISSING_VALUE)),
        )?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read a lake file; the ticker comes from the file name.
pub fn read_history(path: &Path) -> Result<PriceHistory, LakeError> {
    let symbol = ticker_from_file_name(path)?;
    let file = File::open(path).map_err(|source| LakeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(symbol, file).map_err(|source| LakeError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_history_for(dir: &Path, symbol: &Symbol) -> Result<PriceHistory, LakeError> {
    read_history(&history_path(dir, symbol))
}

/// Parse history CSV text. Empty cells read as `nan`; short rows simply lack
/// the trailing columns.
pub fn read_csv<R: Read>(symbol: Symbol, reader: R) -> Result<PriceHistory, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();

    let mut history = PriceHistory::new(symbol, header.iter().cloned());
    for record in csv_reader.records() {
        let record = record?;
        let row = header
            .iter()
            .zip(record.iter())
            .map(|(name, value)| {
                let value = if value.is_empty() { MISSING_VALUE } else { value };
                (name.as_str(), value)
            })
            .fold(RawRow::new(), |row, (name, value)| row.with(name, value));
        history.push(row);
    }

    Ok(history)
}
