use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::domain::{Column, RawRow, Symbol, TypedRow};

/// A single reason a row was rejected.
///
/// The `Display` form is the exact tag written to the quarantine file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    /// `'<column>' column missing`
    ColumnMissing(String),
    /// `'<column>' format`
    ColumnFormat(String),
    /// `Date val`
    DateOutOfRange,
    /// `Num val`
    NegativePrice,
}

impl ErrorTag {
    pub fn category(&self) -> RuleCategory {
        match self {
            Self::ColumnMissing(_) => RuleCategory::Structural,
            Self::ColumnFormat(column) if column == Column::Date.name() => {
                RuleCategory::DateFormat
            }
            Self::ColumnFormat(_) => RuleCategory::NumericFormat,
            Self::DateOutOfRange => RuleCategory::DateRange,
            Self::NegativePrice => RuleCategory::PriceRange,
        }
    }
}

impl Display for ErrorTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColumnMissing(column) => write!(f, "'{column}' column missing"),
            Self::ColumnFormat(column) => write!(f, "'{column}' format"),
            Self::DateOutOfRange => f.write_str("Date val"),
            Self::NegativePrice => f.write_str("Num val"),
        }
    }
}

impl Serialize for ErrorTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Structural,
    DateFormat,
    NumericFormat,
    DateRange,
    PriceRange,
}

/// Ordered, duplicate-free list of tags attached to one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Verdict {
    tags: Vec<ErrorTag>,
}

impl Verdict {
    pub fn push(&mut self, tag: ErrorTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn tags(&self) -> &[ErrorTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn categories(&self) -> BTreeSet<RuleCategory> {
        self.tags.iter().map(ErrorTag::category).collect()
    }

    /// Tags joined by `", "`, the `type_error` cell of the quarantine file.
    pub fn joined(&self) -> String {
        self.tags
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<ErrorTag> for Verdict {
    fn from_iter<I: IntoIterator<Item = ErrorTag>>(iter: I) -> Self {
        let mut verdict = Self::default();
        for tag in iter {
            verdict.push(tag);
        }
        verdict
    }
}

/// Which stage rejected the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// A required column is absent.
    Structural,
    /// A value has the wrong textual shape.
    Shape,
    /// A recast value is outside its allowed range.
    Range,
}

/// The rejected row as it stood when it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RowPayload {
    Raw(RawRow),
    Typed(TypedRow),
}

impl RowPayload {
    pub fn to_raw(&self) -> RawRow {
        match self {
            Self::Raw(row) => row.clone(),
            Self::Typed(row) => row.to_raw(),
        }
    }
}

/// A rejected row with every reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRow {
    pub symbol: Symbol,
    pub kind: RejectionKind,
    pub row: RowPayload,
    pub tags: Verdict,
}

impl InvalidRow {
    pub fn type_error(&self) -> String {
        self.tags.joined()
    }
}
