use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::timestamp::parse_calendar_date;
use crate::domain::{Column, RawRow};

use super::verdict::{ErrorTag, Verdict};

/// Optional minus, digits, optional point, digits. Empty text matches too.
static NUMERIC_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]*\.?[0-9]*$").expect("numeric shape pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Malformed,
    Missing,
}

/// Per-column result of the shape stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeCheck {
    pub column: String,
    pub status: CheckStatus,
}

impl ShapeCheck {
    fn new(column: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            column: column.into(),
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeReport {
    pub checks: Vec<ShapeCheck>,
    pub verdict: Verdict,
}

impl ShapeReport {
    /// Whether any canonical column was absent.
    pub fn is_structural(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.status == CheckStatus::Missing)
    }
}

pub fn matches_numeric_shape(text: &str) -> bool {
    NUMERIC_SHAPE.is_match(text)
}

/// Check the `Date` column, every numeric-grammar column present, and the
/// presence of the canonical numeric columns, in that order.
pub fn check_shape(row: &RawRow) -> ShapeReport {
    let mut report = ShapeReport::default();

    let date = Column::Date.name();
    match row.get(date) {
        Some(text) if parse_calendar_date(text).is_some() => {
            report.checks.push(ShapeCheck::new(date, CheckStatus::Ok));
        }
        Some(_) => {
            report.checks.push(ShapeCheck::new(date, CheckStatus::Malformed));
            report.verdict.push(ErrorTag::ColumnFormat(date.to_string()));
        }
        None => {
            report.checks.push(ShapeCheck::new(date, CheckStatus::Missing));
            report.verdict.push(ErrorTag::ColumnMissing(date.to_string()));
        }
    }

    let numeric_columns = row.iter().filter(|(name, _)| {
        Column::from_name(name).map_or(true, Column::is_numeric)
    });
    for (name, text) in numeric_columns {
        if matches_numeric_shape(text) {
            report.checks.push(ShapeCheck::new(name, CheckStatus::Ok));
        } else {
            report.checks.push(ShapeCheck::new(name, CheckStatus::Malformed));
            report.verdict.push(ErrorTag::ColumnFormat(name.to_string()));
        }
    }

    // `date_modification` is source metadata; rows without it are still whole.
    for column in Column::ALL.into_iter().filter(|column| column.is_numeric()) {
        if row.column(column).is_none() {
            report
                .checks
                .push(ShapeCheck::new(column.name(), CheckStatus::Missing));
            report
                .verdict
                .push(ErrorTag::ColumnMissing(column.name().to_string()));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RawRow {
        RawRow::from_pairs([
            ("Date", "2024-03-01"),
            ("Open", "10.0"),
            ("High", "11.0"),
            ("Low", "9.5"),
            ("Close", "10.5"),
            ("Volume", "1000"),
            ("Dividends", "0.0"),
            ("Stock_Splits", "0.0"),
            ("date_modification", "2024-03-01 18:00:00"),
        ])
    }

    #[test]
    fn numeric_shape_accepts_the_documented_grammar() {
        for text in ["", "-", ".", "10", "-10.5", ".5", "10.", "007"] {
            assert!(matches_numeric_shape(text), "{text}");
        }
        for text in ["abc", "1e5", "+1", "1,000", "1.2.3", "nan", " 1", "１"] {
            assert!(!matches_numeric_shape(text), "{text}");
        }
    }

    #[test]
    fn clean_row_checks_every_column_once() {
        let report = check_shape(&row());
        assert!(report.verdict.is_empty());
        assert_eq!(report.checks.len(), 8);
        assert!(report.checks.iter().all(ShapeCheck::is_ok));
    }

    #[test]
    fn extra_columns_are_held_to_the_numeric_grammar() {
        let report = check_shape(&row().with("Adj Close", "n/a"));
        assert_eq!(
            report.verdict.tags(),
            [ErrorTag::ColumnFormat(String::from("Adj Close"))]
        );
    }

    #[test]
    fn missing_columns_are_structural() {
        let report = check_shape(&row().without("Date").without("Volume"));
        assert!(report.is_structural());
        assert_eq!(report.verdict.joined(), "'Date' column missing, 'Volume' column missing");
    }

    #[test]
    fn date_modification_is_neither_shape_checked_nor_required() {
        assert!(check_shape(&row().with("date_modification", "yesterday"))
            .verdict
            .is_empty());
        assert!(check_shape(&row().without("date_modification"))
            .verdict
            .is_empty());
    }
}
