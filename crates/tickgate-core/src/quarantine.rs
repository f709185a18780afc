//! Run-wide accumulator for rejected rows and its CSV file.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::domain::Column;
use crate::validator::InvalidRow;
use crate::QuarantineError;

pub const TICKER_COLUMN: &str = "ticker";
pub const TYPE_ERROR_COLUMN: &str = "type_error";

/// Rejected rows of one run, in the order they were rejected.
#[derive(Debug, Clone, Default)]
pub struct Quarantine {
    rows: Vec<InvalidRow>,
}

impl Quarantine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: InvalidRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[InvalidRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `ticker`, the canonical columns, any extra columns seen, `type_error`.
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = std::iter::once(TICKER_COLUMN)
            .chain(Column::ALL.into_iter().map(Column::name))
            .map(String::from)
            .collect();

        for invalid in &self.rows {
            for name in invalid.row.to_raw().columns() {
                if !header.iter().any(|existing| existing == name) {
                    header.push(name.to_string());
                }
            }
        }

        header.push(TYPE_ERROR_COLUMN.to_string());
        header
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), QuarantineError> {
        let header = self.header();
        let data_columns = &header[1..header.len() - 1];

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&header)?;
        for invalid in &self.rows {
            let raw = invalid.row.to_raw();
            let mut record = Vec::with_capacity(header.len());
            record.push(invalid.symbol.to_string());
            record.extend(
                data_columns
                    .iter()
                    .map(|name| raw.get(name).unwrap_or_default().to_string()),
            );
            record.push(invalid.type_error());
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write the file once at the end of a run. Nothing is written, and `0`
    /// is returned, when no row was rejected.
    pub fn flush_to(&self, path: &Path) -> Result<usize, QuarantineError> {
        if self.is_empty() {
            return Ok(0);
        }

        let io_error = |source| QuarantineError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let file = File::create(path).map_err(io_error)?;
        self.write_csv(file)?;
        Ok(self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawRow, Symbol};
    use crate::validator::{ErrorTag, RejectionKind, RowPayload};

    fn invalid(symbol: &str, row: RawRow, tags: Vec<ErrorTag>) -> InvalidRow {
        InvalidRow {
            symbol: Symbol::parse(symbol).expect("symbol"),
            kind: RejectionKind::Shape,
            row: RowPayload::Raw(row),
            tags: tags.into_iter().collect(),
        }
    }

    #[test]
    fn empty_quarantine_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("unvalid_data.csv");
        assert_eq!(Quarantine::new().flush_to(&path).expect("flush"), 0);
        assert!(!path.exists());
    }

    #[test]
    fn rows_are_written_with_ticker_and_joined_tags() {
        let mut quarantine = Quarantine::new();
        quarantine.push(invalid(
            "AI.PA",
            RawRow::from_pairs([("Date", "2024-03-01"), ("Close", "abc"), ("Open", "x")]),
            vec![
                ErrorTag::ColumnFormat(String::from("Open")),
                ErrorTag::ColumnFormat(String::from("Close")),
            ],
        ));
        quarantine.push(invalid(
            "OR.PA",
            RawRow::from_pairs([("Date", "bad"), ("Adj Close", "1")]),
            vec![ErrorTag::ColumnFormat(String::from("Date"))],
        ));

        let mut buffer = Vec::new();
        quarantine.write_csv(&mut buffer).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "ticker,Date,Open,High,Low,Close,Volume,Dividends,Stock_Splits,date_modification,Adj Close,type_error"
        );
        assert_eq!(
            lines[1],
            "AI.PA,2024-03-01,x,,,abc,,,,,,\"'Open' format, 'Close' format\""
        );
        assert_eq!(lines[2], "OR.PA,bad,,,,,,,,,1,'Date' format");
    }

    #[test]
    fn flush_creates_parent_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out").join("unvalid_data.csv");
        let mut quarantine = Quarantine::new();
        quarantine.push(invalid(
            "AI.PA",
            RawRow::from_pairs([("Date", "x")]),
            vec![ErrorTag::ColumnFormat(String::from("Date"))],
        ));

        assert_eq!(quarantine.flush_to(&path).expect("flush"), 1);
        assert!(path.exists());
    }
}
