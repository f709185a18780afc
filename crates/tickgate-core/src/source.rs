use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;

use crate::domain::{PriceHistory, Symbol};
use crate::lake;
use crate::LakeError;

/// History retrieval failures.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name} transport failed: {message}")]
    Transport {
        source_name: &'static str,
        message: String,
    },
    #[error("{source_name} returned HTTP {status} for '{symbol}'")]
    Status {
        source_name: &'static str,
        symbol: String,
        status: u16,
    },
    #[error("{source_name} payload for '{symbol}' is unusable: {message}")]
    Payload {
        source_name: &'static str,
        symbol: String,
        message: String,
    },
    #[error(transparent)]
    Lake(#[from] LakeError),
}

pub type HistoryFuture<'a> = Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>>;

/// Provider of a ticker's full daily history as text rows.
pub trait HistorySource: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch_history<'a>(&'a self, symbol: &'a Symbol) -> HistoryFuture<'a>;
}

/// Replays histories already persisted in the data lake.
#[derive(Debug, Clone)]
pub struct LakeSource {
    dir: PathBuf,
}

impl LakeSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl HistorySource for LakeSource {
    fn name(&self) -> &'static str {
        "lake"
    }

    fn fetch_history<'a>(&'a self, symbol: &'a Symbol) -> HistoryFuture<'a> {
        Box::pin(async move { Ok(lake::read_history_for(&self.dir, symbol)?) })
    }
}
