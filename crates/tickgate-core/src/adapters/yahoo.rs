use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::domain::timestamp::{format_date, format_timestamp, local_now};
use crate::domain::{Column, PriceHistory, RawRow, Symbol, MISSING_VALUE};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::source::{HistoryFuture, HistorySource, SourceError};

const SOURCE_NAME: &str = "yahoo";
const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Full daily history from the Yahoo v8 chart endpoint.
///
/// Bars are keyed by their exchange-local date; dividends and splits are
/// folded into the bar of the same date and default to `0`.
#[derive(Clone)]
pub struct YahooChartSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    fetched_at: Option<PrimitiveDateTime>,
}

impl Default for YahooChartSource {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooChartSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 15_000,
            fetched_at: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Pin the `date_modification` stamp instead of reading the clock.
    pub fn with_fetched_at(mut self, fetched_at: PrimitiveDateTime) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/v8/finance/chart/{}?range=max&interval=1d&events=div%2Csplits&includeAdjustedClose=false",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        )
    }
}

impl HistorySource for YahooChartSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn fetch_history<'a>(&'a self, symbol: &'a Symbol) -> HistoryFuture<'a> {
        Box::pin(async move {
            let request = HttpRequest::get(self.chart_url(symbol))
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);
            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|error| SourceError::Transport {
                    source_name: SOURCE_NAME,
                    message: error.message().to_string(),
                })?;

            if !response.is_success() {
                return Err(SourceError::Status {
                    source_name: SOURCE_NAME,
                    symbol: symbol.to_string(),
                    status: response.status,
                });
            }

            let fetched_at = self.fetched_at.unwrap_or_else(local_now);
            parse_chart(symbol, &response.body, fetched_at)
        })
    }
}

/// Convert a chart payload into a text history, oldest bar first.
pub fn parse_chart(
    symbol: &Symbol,
    body: &str,
    fetched_at: PrimitiveDateTime,
) -> Result<PriceHistory, SourceError> {
    let payload_error = |message: String| SourceError::Payload {
        source_name: SOURCE_NAME,
        symbol: symbol.to_string(),
        message,
    };

    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| payload_error(format!("failed to parse chart: {e}")))?;
    if let Some(error) = response.chart.error {
        return Err(payload_error(format!(
            "{}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }
    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| payload_error(String::from("no chart result")))?;

    let gmt_offset = result.meta.gmtoffset.unwrap_or(0);
    let local_date = |timestamp: i64| -> Result<Date, SourceError> {
        OffsetDateTime::from_unix_timestamp(timestamp.saturating_add(gmt_offset))
            .map(OffsetDateTime::date)
            .map_err(|e| payload_error(format!("invalid timestamp {timestamp}: {e}")))
    };

    let events = result.events.unwrap_or_default();
    let mut dividends = HashMap::new();
    for dividend in events.dividends.values() {
        dividends.insert(local_date(dividend.date)?, dividend.amount);
    }
    let mut splits = HashMap::new();
    for split in events.splits.values() {
        if split.denominator != 0.0 {
            splits.insert(local_date(split.date)?, split.numerator / split.denominator);
        }
    }

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .unwrap_or_default();

    let stamp = format_timestamp(fetched_at);
    let mut history = PriceHistory::new(symbol.clone(), Column::ALL.map(Column::name));
    for (index, &timestamp) in timestamps.iter().enumerate() {
        let date = local_date(timestamp)?;

        history.push(RawRow::from_pairs([
            (Column::Date.name(), format_date(date)),
            (Column::Open.name(), price_cell(&quote.open, index)),
            (Column::High.name(), price_cell(&quote.high, index)),
            (Column::Low.name(), price_cell(&quote.low, index)),
            (Column::Close.name(), price_cell(&quote.close, index)),
            (
                Column::Volume.name(),
                quote
                    .volume
                    .get(index)
                    .copied()
                    .flatten()
                    .map_or_else(|| MISSING_VALUE.to_string(), |volume| volume.to_string()),
            ),
            (Column::Dividends.name(), render_event(dividends.get(&date))),
            (Column::StockSplits.name(), render_event(splits.get(&date))),
            (Column::DateModification.name(), stamp.clone()),
        ]));
    }

    Ok(history)
}

fn price_cell(series: &[Option<f64>], index: usize) -> String {
    render(series.get(index).copied().flatten())
}

fn render(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => value.to_string(),
        _ => MISSING_VALUE.to_string(),
    }
}

fn render_event(value: Option<&f64>) -> String {
    value.map_or_else(|| String::from("0"), |value| render(Some(*value)))
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    events: Option<ChartEvents>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: BTreeMap<String, DividendEvent>,
    #[serde(default)]
    splits: BTreeMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
