use std::path::PathBuf;

use thiserror::Error;

/// Domain validation failures for identifiers accepted from users and files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("invalid calendar date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A row passed the shape checks but a typed conversion still failed.
///
/// This aborts validation of the row instead of producing a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecastError {
    #[error("column '{column}' value '{value}' cannot be recast to {target}")]
    Unconvertible {
        column: &'static str,
        value: String,
        target: &'static str,
    },
    #[error("column '{column}' is absent after shape checks")]
    MissingColumn { column: &'static str },
}

/// Failures while reading or writing the raw CSV data lake.
#[derive(Debug, Error)]
pub enum LakeError {
    #[error("data lake I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed history CSV '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot derive a ticker from file name '{0}'")]
    UnrecognizedFileName(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failures while writing the quarantine file.
#[derive(Debug, Error)]
pub enum QuarantineError {
    #[error("quarantine I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("quarantine CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures while writing the per-day export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Warehouse(#[from] tickgate_warehouse::WarehouseError),
    #[error("export I/O failed for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures while loading the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid ticker in config: {0}")]
    Ticker(#[from] ValidationError),
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Recast(#[from] RecastError),
    #[error(transparent)]
    Lake(#[from] LakeError),
    #[error(transparent)]
    Source(#[from] crate::source::SourceError),
    #[error(transparent)]
    Quarantine(#[from] QuarantineError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Warehouse(#[from] tickgate_warehouse::WarehouseError),
}
