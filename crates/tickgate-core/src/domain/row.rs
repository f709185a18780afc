use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use time::{Date, PrimitiveDateTime};

use tickgate_warehouse::DailyPriceRecord;

use super::columns::Column;
use super::timestamp::{format_date, format_timestamp};

/// Text rendering of a missing value, as written by the history source.
pub const MISSING_VALUE: &str = "nan";

/// One row as text, keyed by column name in source order.
///
/// Columns outside the canonical nine are kept so they can be shape-checked
/// and carried into the quarantine file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |row, (name, value)| row.with(name, value))
    }

    /// Set a column, replacing an existing value in place.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|(existing, _)| existing != name);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn column(&self, column: Column) -> Option<&str> {
        self.get(column.name())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A fully recast price row.
///
/// Prices and corporate-action amounts stay decimal so the text a row was
/// read from can be reproduced exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedRow {
    #[serde(rename = "Date", serialize_with = "serialize_date")]
    pub date: Date,
    #[serde(rename = "Open")]
    pub open: Decimal,
    #[serde(rename = "High")]
    pub high: Decimal,
    #[serde(rename = "Low")]
    pub low: Decimal,
    #[serde(rename = "Close")]
    pub close: Decimal,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "Dividends")]
    pub dividends: Decimal,
    #[serde(rename = "Stock_Splits")]
    pub stock_splits: Decimal,
    #[serde(
        serialize_with = "serialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_modification: Option<PrimitiveDateTime>,
}

impl TypedRow {
    pub fn price(&self, column: Column) -> Option<Decimal> {
        match column {
            Column::Open => Some(self.open),
            Column::High => Some(self.high),
            Column::Low => Some(self.low),
            Column::Close => Some(self.close),
            _ => None,
        }
    }

    /// Render one column back to the text form accepted by the validator.
    /// Only an unstamped `date_modification` renders as `None`.
    pub fn cell(&self, column: Column) -> Option<String> {
        let text = match column {
            Column::Date => format_date(self.date),
            Column::Open => self.open.to_string(),
            Column::High => self.high.to_string(),
            Column::Low => self.low.to_string(),
            Column::Close => self.close.to_string(),
            Column::Volume => self.volume.to_string(),
            Column::Dividends => self.dividends.to_string(),
            Column::StockSplits => self.stock_splits.to_string(),
            Column::DateModification => return self.date_modification.map(format_timestamp),
        };
        Some(text)
    }

    pub fn to_raw(&self) -> RawRow {
        RawRow::from_pairs(
            Column::ALL
                .into_iter()
                .filter_map(|column| self.cell(column).map(|text| (column.name(), text))),
        )
    }

    /// Storage shape; decimals narrow to `f64` here and nowhere else.
    pub fn to_record(&self) -> DailyPriceRecord {
        let float = |value: Decimal| value.to_f64().unwrap_or(f64::NAN);
        DailyPriceRecord {
            date: format_date(self.date),
            open: float(self.open),
            high: float(self.high),
            low: float(self.low),
            close: float(self.close),
            volume: self.volume,
            dividends: float(self.dividends),
            stock_splits: float(self.stock_splits),
            date_modification: self.date_modification.map(format_timestamp),
        }
    }
}

fn serialize_date<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(*value))
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<PrimitiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_str(&format_timestamp(*value)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::{date, datetime};

    fn typed() -> TypedRow {
        TypedRow {
            date: date!(2024 - 03 - 01),
            open: Decimal::from_str("10.0").expect("decimal"),
            high: Decimal::from_str("11").expect("decimal"),
            low: Decimal::from_str("9.5").expect("decimal"),
            close: Decimal::from_str("10.5").expect("decimal"),
            volume: 1000,
            dividends: Decimal::ZERO,
            stock_splits: Decimal::ZERO,
            date_modification: Some(datetime!(2024-03-01 18:00:00)),
        }
    }

    #[test]
    fn set_replaces_in_place_and_keeps_order() {
        let row = RawRow::new()
            .with("Date", "2024-03-01")
            .with("Open", "1")
            .with("Date", "2024-03-02");
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Date", "Open"]);
        assert_eq!(row.get("Date"), Some("2024-03-02"));
    }

    #[test]
    fn raw_rendering_keeps_decimal_scale() {
        let raw = typed().to_raw();
        assert_eq!(raw.column(Column::Open), Some("10.0"));
        assert_eq!(raw.column(Column::High), Some("11"));
        assert_eq!(
            raw.column(Column::DateModification),
            Some("2024-03-01 18:00:00")
        );
        assert_eq!(raw.len(), 9);
    }

    #[test]
    fn unstamped_row_renders_without_date_modification() {
        let row = TypedRow {
            date_modification: None,
            ..typed()
        };
        assert_eq!(row.to_raw().len(), 8);
        assert_eq!(row.to_record().date_modification, None);
    }

    #[test]
    fn record_carries_storage_values() {
        let record = typed().to_record();
        assert_eq!(record.date, "2024-03-01");
        assert_eq!(record.close, 10.5);
        assert_eq!(record.volume, 1000);
    }

    #[test]
    fn serializes_with_column_names() {
        let json = serde_json::to_value(typed()).expect("json");
        assert_eq!(json["Date"], "2024-03-01");
        assert_eq!(json["Stock_Splits"], "0");
        assert_eq!(json["date_modification"], "2024-03-01 18:00:00");
    }
}
