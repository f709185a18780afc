//! # Row Validator
//!
//! Decides whether the latest row of a ticker's history is fit to store.
//!
//! ```text
//! Initial ──shape──▶ ShapeChecked ──recast──▶ Recast ──range──▶ Accepted
//!    │                                          │
//!    └── missing / malformed column ──▶ Rejected ◀── Date val / Num val
//! ```
//!
//! Shape failures stop the row before any conversion. Range failures happen
//! on the typed row, so the quarantined payload keeps typed values. A value
//! that passes the shape grammar but still cannot be converted (`"-"`, `"."`)
//! surfaces as a [`RecastError`] instead of a verdict.
//!
//! The validator does no I/O and no logging; callers get a
//! [`ValidationReport`] with per-column outcomes and decide what to log.
//!
//! ```rust
//! use tickgate_core::{Outcome, PriceHistory, RawRow, RowValidator, Symbol, ValidationPolicy};
//! use time::macros::date;
//!
//! let mut history = PriceHistory::new(Symbol::parse("AI.PA").unwrap(), ["Date"]);
//! history.push(RawRow::from_pairs([
//!     ("Date", "2024-03-01"),
//!     ("Open", "-5"),
//!     ("High", "11"),
//!     ("Low", "10"),
//!     ("Close", "10.8"),
//!     ("Volume", "1000"),
//!     ("Dividends", "0"),
//!     ("Stock_Splits", "0"),
//! ]));
//!
//! let validator = RowValidator::new(ValidationPolicy::as_of(date!(2024 - 03 - 01)));
//! let report = validator.validate_latest(&history).unwrap();
//! match report.outcome {
//!     Outcome::Rejected(invalid) => assert_eq!(invalid.type_error(), "Num val"),
//!     other => panic!("unexpected outcome {other:?}"),
//! }
//! ```

mod range;
mod recast;
mod shape;
mod verdict;

use serde::Serialize;
use time::macros::date;
use time::Date;

use crate::domain::timestamp::local_today;
use crate::domain::{PriceHistory, RawRow, Symbol, TypedRow};
use crate::RecastError;

pub use range::range_violations;
pub use recast::recast;
pub use shape::{check_shape, matches_numeric_shape, CheckStatus, ShapeCheck, ShapeReport};
pub use verdict::{ErrorTag, InvalidRow, RejectionKind, RowPayload, RuleCategory, Verdict};

/// Earliest trading date a stored row may carry.
pub const EARLIEST_TRADING_DATE: Date = date!(1987 - 12 - 31);

/// Date window applied by the range stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub earliest_date: Date,
    pub today: Date,
}

impl ValidationPolicy {
    /// Window ending at today's date on the local clock.
    pub fn for_today() -> Self {
        Self::as_of(local_today())
    }

    pub const fn as_of(today: Date) -> Self {
        Self {
            earliest_date: EARLIEST_TRADING_DATE,
            today,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::for_today()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "row", rename_all = "snake_case")]
pub enum Outcome {
    Accepted(TypedRow),
    Rejected(InvalidRow),
    /// The history had no rows.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub symbol: Symbol,
    pub checks: Vec<ShapeCheck>,
    pub outcome: Outcome,
}

impl ValidationReport {
    pub fn accepted(&self) -> Option<&TypedRow> {
        match &self.outcome {
            Outcome::Accepted(row) => Some(row),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&InvalidRow> {
        match &self.outcome {
            Outcome::Rejected(invalid) => Some(invalid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowValidator {
    policy: ValidationPolicy,
}

impl RowValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Validate the most recent row of a history.
    pub fn validate_latest(&self, history: &PriceHistory) -> Result<ValidationReport, RecastError> {
        match history.latest() {
            Some(row) => self.validate_row(&history.symbol, row),
            None => Ok(ValidationReport {
                symbol: history.symbol.clone(),
                checks: Vec::new(),
                outcome: Outcome::Empty,
            }),
        }
    }

    pub fn validate_row(&self, symbol: &Symbol, row: &RawRow) -> Result<ValidationReport, RecastError> {
        let shape = check_shape(row);
        if !shape.verdict.is_empty() {
            let kind = if shape.is_structural() {
                RejectionKind::Structural
            } else {
                RejectionKind::Shape
            };
            return Ok(ValidationReport {
                symbol: symbol.clone(),
                checks: shape.checks,
                outcome: Outcome::Rejected(InvalidRow {
                    symbol: symbol.clone(),
                    kind,
                    row: RowPayload::Raw(row.clone()),
                    tags: shape.verdict,
                }),
            });
        }

        let typed = recast(row)?;
        let violations = range_violations(&typed, &self.policy);
        let outcome = if violations.is_empty() {
            Outcome::Accepted(typed)
        } else {
            Outcome::Rejected(InvalidRow {
                symbol: symbol.clone(),
                kind: RejectionKind::Range,
                row: RowPayload::Typed(typed),
                tags: violations.into_iter().collect(),
            })
        };

        Ok(ValidationReport {
            symbol: symbol.clone(),
            checks: shape.checks,
            outcome,
        })
    }
}
