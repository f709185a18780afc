use crate::domain::{Column, TypedRow};

use super::verdict::ErrorTag;
use super::ValidationPolicy;

/// Range rules for a recast row. `Date val` always precedes `Num val`.
pub fn range_violations(row: &TypedRow, policy: &ValidationPolicy) -> Vec<ErrorTag> {
    let mut tags = Vec::new();

    if row.date < policy.earliest_date || row.date > policy.today {
        tags.push(ErrorTag::DateOutOfRange);
    }

    let negative_price = Column::PRICES
        .into_iter()
        .filter_map(|column| row.price(column))
        .any(|price| price.is_sign_negative() && !price.is_zero());
    if negative_price {
        tags.push(ErrorTag::NegativePrice);
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::macros::date;

    fn row() -> TypedRow {
        TypedRow {
            date: date!(2024 - 03 - 01),
            open: Decimal::new(105, 1),
            high: Decimal::new(11, 0),
            low: Decimal::new(10, 0),
            close: Decimal::new(108, 1),
            volume: 1000,
            dividends: Decimal::ZERO,
            stock_splits: Decimal::ZERO,
            date_modification: None,
        }
    }

    fn policy() -> ValidationPolicy {
        ValidationPolicy::as_of(date!(2024 - 03 - 01))
    }

    #[test]
    fn both_window_bounds_are_inclusive() {
        assert!(range_violations(&row(), &policy()).is_empty());

        let earliest = TypedRow {
            date: date!(1987 - 12 - 31),
            ..row()
        };
        assert!(range_violations(&earliest, &policy()).is_empty());
    }

    #[test]
    fn date_outside_window_is_tagged_once() {
        let before = TypedRow {
            date: date!(1987 - 12 - 30),
            ..row()
        };
        let after = TypedRow {
            date: date!(2024 - 03 - 02),
            ..row()
        };
        assert_eq!(range_violations(&before, &policy()), vec![ErrorTag::DateOutOfRange]);
        assert_eq!(range_violations(&after, &policy()), vec![ErrorTag::DateOutOfRange]);
    }

    #[test]
    fn date_tag_comes_before_price_tag() {
        let row = TypedRow {
            date: date!(1900 - 01 - 01),
            low: Decimal::new(-1, 0),
            ..row()
        };
        assert_eq!(
            range_violations(&row, &policy()),
            vec![ErrorTag::DateOutOfRange, ErrorTag::NegativePrice]
        );
    }

    #[test]
    fn negative_zero_is_not_a_negative_price() {
        let row = TypedRow {
            close: Decimal::new(0, 0) * Decimal::NEGATIVE_ONE,
            ..row()
        };
        assert!(range_violations(&row, &policy()).is_empty());
    }
}
