use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::timestamp::{parse_calendar_date, parse_timestamp};
use crate::domain::{Column, RawRow, TypedRow};
use crate::RecastError;

/// Convert a shape-checked row to its semantic types.
///
/// Only called on rows with zero shape errors, so every failure here is a
/// value the grammar admits but that carries no usable number or timestamp.
pub fn recast(row: &RawRow) -> Result<TypedRow, RecastError> {
    let decimal = |column: Column| parse_decimal(column, required(row, column)?);

    let volume = decimal(Column::Volume)?.trunc();
    let volume = volume.to_i64().ok_or_else(|| RecastError::Unconvertible {
        column: Column::Volume.name(),
        value: required(row, Column::Volume).unwrap_or_default().to_string(),
        target: "integer",
    })?;

    let date_text = required(row, Column::Date)?;
    let date = parse_calendar_date(date_text).ok_or_else(|| RecastError::Unconvertible {
        column: Column::Date.name(),
        value: date_text.to_string(),
        target: "date",
    })?;

    let date_modification = row
        .column(Column::DateModification)
        .map(|text| {
            parse_timestamp(text).ok_or_else(|| RecastError::Unconvertible {
                column: Column::DateModification.name(),
                value: text.to_string(),
                target: "timestamp",
            })
        })
        .transpose()?;

    Ok(TypedRow {
        date,
        open: decimal(Column::Open)?,
        high: decimal(Column::High)?,
        low: decimal(Column::Low)?,
        close: decimal(Column::Close)?,
        volume,
        dividends: decimal(Column::Dividends)?,
        stock_splits: decimal(Column::StockSplits)?,
        date_modification,
    })
}

fn required(row: &RawRow, column: Column) -> Result<&str, RecastError> {
    row.column(column).ok_or(RecastError::MissingColumn {
        column: column.name(),
    })
}

/// Parse text admitted by the numeric grammar; `"10."` reads as `10` and
/// `".5"` as `0.5`.
fn parse_decimal(column: Column, text: &str) -> Result<Decimal, RecastError> {
    let unconvertible = || RecastError::Unconvertible {
        column: column.name(),
        value: text.to_string(),
        target: "decimal",
    };

    let (sign, magnitude) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    if !magnitude.bytes().any(|byte| byte.is_ascii_digit()) {
        return Err(unconvertible());
    }

    let mut normalized = String::with_capacity(text.len() + 2);
    normalized.push_str(sign);
    if magnitude.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(magnitude.strip_suffix('.').unwrap_or(magnitude));

    Decimal::from_str(&normalized).map_err(|_| unconvertible())
}
