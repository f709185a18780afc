//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated exchange ticker |
//! | [`Column`] | The nine canonical price-row columns |
//! | [`RawRow`] | One row as text, in source column order |
//! | [`TypedRow`] | One row after recasting |
//! | [`PriceHistory`] | A ticker's rows, oldest first |
//!
//! A [`RawRow`] is what sources and the data lake produce. Only the
//! validator turns one into a [`TypedRow`].

mod columns;
mod history;
mod row;
mod symbol;
pub mod timestamp;

pub use columns::Column;
pub use history::PriceHistory;
pub use row::{RawRow, TypedRow, MISSING_VALUE};
pub use symbol::Symbol;
