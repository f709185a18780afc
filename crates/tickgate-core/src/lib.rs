//! # Tickgate Core
//!
//! Validation gate between raw daily price histories and the warehouse.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Symbols, columns, raw and typed rows, histories |
//! | [`validator`] | Shape checks, recast and range filters for the latest row |
//! | [`quarantine`] | Run-wide accumulator of rejected rows and its CSV file |
//! | [`lake`] | `<TICKER>_Historical_Data.csv` history files |
//! | [`source`] | `HistorySource` trait and the lake-backed source |
//! | [`adapters`] | Yahoo chart history source |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pipeline`] | The daily-update run |
//! | [`export`] | Per-day CSV export from the warehouse |
//! | [`config`] | Pipeline configuration |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────┐
//! │ HistorySource  │────▶│ Data lake    │
//! │ (Yahoo / lake) │     │ (CSV files)  │
//! └───────┬────────┘     └──────────────┘
//!         │ PriceHistory
//!         ▼
//! ┌────────────────┐  Rejected  ┌──────────────┐
//! │ RowValidator   │──────────▶│ Quarantine   │
//! └───────┬────────┘            └──────────────┘
//!         │ Accepted(TypedRow)
//!         ▼
//! ┌────────────────┐
//! │ PriceStore     │
//! │ (warehouse)    │
//! └────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod http_client;
pub mod lake;
pub mod pipeline;
pub mod quarantine;
pub mod source;
pub mod validator;

// Re-export commonly used types at crate root for convenience

pub use adapters::YahooChartSource;
pub use config::{PipelineConfig, CAC40_TICKERS};
pub use domain::{Column, PriceHistory, RawRow, Symbol, TypedRow, MISSING_VALUE};
pub use error::{
    ConfigError, CoreError, ExportError, LakeError, QuarantineError, RecastError, ValidationError,
};
pub use export::{export_day, ExportReport};
pub use http_client::{CannedHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use pipeline::{DailyUpdate, RunSummary, TickerIssue};
pub use quarantine::Quarantine;
pub use source::{HistorySource, LakeSource, SourceError};
pub use validator::{
    CheckStatus, ErrorTag, InvalidRow, Outcome, RejectionKind, RowPayload, RowValidator,
    RuleCategory, ShapeCheck, ValidationPolicy, ValidationReport, Verdict, EARLIEST_TRADING_DATE,
};
