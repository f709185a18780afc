use serde::Serialize;

use super::row::RawRow;
use super::symbol::Symbol;

/// Daily price history for one ticker, oldest row first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceHistory {
    pub symbol: Symbol,
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl PriceHistory {
    pub fn new<I, S>(symbol: Symbol, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbol,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; columns not yet in the header are added to it.
    pub fn push(&mut self, row: RawRow) {
        for name in row.columns() {
            if !self.columns.iter().any(|existing| existing == name) {
                self.columns.push(name.to_string());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// The most recent row, which is the only one the validator looks at.
    pub fn latest(&self) -> Option<&RawRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_is_the_last_pushed_row_and_header_grows() {
        let symbol = Symbol::parse("AI.PA").expect("symbol");
        let mut history = PriceHistory::new(symbol, ["Date", "Open"]);
        history.push(RawRow::new().with("Date", "2024-02-29").with("Open", "1"));
        history.push(
            RawRow::new()
                .with("Date", "2024-03-01")
                .with("Open", "2")
                .with("Extra", "x"),
        );

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().and_then(|row| row.get("Open")), Some("2"));
        assert_eq!(history.columns(), ["Date", "Open", "Extra"]);
    }
}
