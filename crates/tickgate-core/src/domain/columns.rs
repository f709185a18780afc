use std::fmt::{Display, Formatter};

/// The nine columns of a daily price row, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    Dividends,
    StockSplits,
    DateModification,
}

impl Column {
    pub const ALL: [Self; 9] = [
        Self::Date,
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::Volume,
        Self::Dividends,
        Self::StockSplits,
        Self::DateModification,
    ];

    /// Columns that must never be negative.
    pub const PRICES: [Self; 4] = [Self::Open, Self::High, Self::Low, Self::Close];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::Dividends => "Dividends",
            Self::StockSplits => "Stock_Splits",
            Self::DateModification => "date_modification",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    /// Whether the column's text must match the numeric grammar.
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Date | Self::DateModification)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("Stock Splits"), None);
    }
}
