//! Behavior-driven tests for the daily update run
//!
//! These tests verify how a run routes each ticker (accepted, quarantined,
//! skipped), what lands in the warehouse, the data lake and the quarantine
//! file, and what the per-day export contains afterwards.

use std::fs;
use std::sync::Arc;

use tempfile::{tempdir, TempDir};
use tickgate_core::lake;
use tickgate_core::{
    export_day, CannedHttpClient, DailyUpdate, HttpError, HttpResponse, LakeSource, Quarantine,
    RowValidator, Symbol, ValidationPolicy, YahooChartSource,
};
use tickgate_warehouse::{PriceStoreReader, Warehouse, WarehouseConfig};
use time::macros::{date, datetime};

fn open_warehouse(temp: &TempDir) -> Warehouse {
    Warehouse::open(WarehouseConfig {
        tickgate_home: temp.path().to_path_buf(),
        db_path: temp.path().join("warehouse.duckdb"),
        max_pool_size: 2,
    })
    .expect("warehouse open")
}

fn validator() -> RowValidator {
    RowValidator::new(ValidationPolicy::as_of(date!(2024 - 03 - 01)))
}

fn symbols(tickers: &[&str]) -> Vec<Symbol> {
    tickers
        .iter()
        .map(|ticker| Symbol::parse(ticker).expect("symbol"))
        .collect()
}

/// Two Paris sessions, 2024-02-29 and 2024-03-01; the latest close is given.
fn chart(latest_open: &str, latest_close: &str) -> HttpResponse {
    HttpResponse::ok_json(format!(
        r#"{{"chart":{{"result":[{{
            "meta":{{"gmtoffset":3600}},
            "timestamp":[1709193600,1709280000],
            "indicators":{{"quote":[{{
                "open":[100.0,{latest_open}],
                "high":[102.0,103.5],
                "low":[99.0,100.5],
                "close":[101.0,{latest_close}],
                "volume":[5000,6000]
            }}]}}
        }}],"error":null}}}}"#
    ))
}

// =============================================================================
// Daily Update: Routing
// =============================================================================

#[tokio::test]
async fn when_a_run_mixes_good_bad_and_failing_tickers_each_is_routed_and_the_run_completes() {
    // Given: One clean ticker, one with a negative price, one the source cannot serve
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = Arc::new(
        CannedHttpClient::new()
            .respond(Ok(chart("101.5", "102.75")))
            .respond(Ok(chart("-1.0", "102.75")))
            .respond(Err(HttpError::new("connection failed: refused"))),
    );
    let source = YahooChartSource::new(client).with_fetched_at(datetime!(2024-03-01 18:00:00));
    let lake_dir = temp.path().join("financial_data_lake");
    let mut quarantine = Quarantine::new();

    // When: The daily update runs over the three tickers
    let summary = DailyUpdate::new(&source, &warehouse, validator(), "run-1")
        .with_lake_dir(&lake_dir)
        .run(&symbols(&["AI.PA", "OR.PA", "MC.PA"]), &mut quarantine)
        .await;

    // Then: Each ticker is routed and nothing aborted the run
    assert_eq!(summary.accepted, vec!["AI.PA".to_string()]);
    assert_eq!(summary.quarantined.len(), 1);
    assert_eq!(summary.quarantined[0].symbol, "OR.PA");
    assert_eq!(summary.quarantined[0].reason, "Num val");
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].symbol, "MC.PA");
    assert_eq!(summary.processed(), 3);

    // Then: Only the accepted row is stored, and every ticker has an audit row
    let stored = warehouse.rows_for_date("AI.PA", "2024-03-01").expect("read");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].close, 102.75);
    assert_eq!(stored[0].date_modification.as_deref(), Some("2024-03-01 18:00:00"));
    assert!(warehouse.rows_for_date("OR.PA", "2024-03-01").expect("read").is_empty());
    assert_eq!(warehouse.ingest_log_count("run-1").expect("count"), 3);

    // Then: Fetched histories were written to the lake
    assert!(lake::history_path(&lake_dir, &symbols(&["AI.PA"])[0]).exists());
    assert!(lake::history_path(&lake_dir, &symbols(&["OR.PA"])[0]).exists());
    assert_eq!(quarantine.len(), 1);
}

#[tokio::test]
async fn when_the_latest_row_is_malformed_the_ticker_is_skipped_but_recorded_in_quarantine() {
    // Given: A lake file whose latest row has a non-numeric close
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let lake_dir = temp.path().join("lake");
    fs::create_dir_all(&lake_dir).expect("lake dir");
    fs::write(
        lake_dir.join("SAN.PA_Historical_Data.csv"),
        "Date,Open,High,Low,Close,Volume,Dividends,Stock_Splits,date_modification\n\
         2024-03-01,90,91,89,abc,100,0,0,2024-03-01 18:00:00\n",
    )
    .expect("write lake file");
    let mut quarantine = Quarantine::new();

    // When: An offline run reads it back from the lake
    let source = LakeSource::new(&lake_dir);
    let summary = DailyUpdate::new(&source, &warehouse, validator(), "run-2")
        .run(&symbols(&["SAN.PA"]), &mut quarantine)
        .await;

    // Then: Skipped with the shape tag, never inserted
    assert!(summary.accepted.is_empty());
    assert_eq!(summary.skipped[0].reason, "'Close' format");
    assert!(warehouse.rows_for_date("SAN.PA", "2024-03-01").expect("read").is_empty());
    assert_eq!(quarantine.rows()[0].type_error(), "'Close' format");
}

#[tokio::test]
async fn when_a_lake_file_is_missing_the_ticker_is_skipped() {
    // Given: An empty lake
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let source = LakeSource::new(temp.path().join("empty-lake"));
    let mut quarantine = Quarantine::new();

    // When: An offline run asks for a ticker
    let summary = DailyUpdate::new(&source, &warehouse, validator(), "run-3")
        .run(&symbols(&["DG.PA"]), &mut quarantine)
        .await;

    // Then: Skipped, with nothing quarantined
    assert_eq!(summary.skipped.len(), 1);
    assert!(quarantine.is_empty());
}

// =============================================================================
// Daily Update: Outputs
// =============================================================================

#[tokio::test]
async fn when_the_run_ends_the_quarantine_file_and_export_reflect_it() {
    // Given: A run with one accepted and one quarantined ticker
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = Arc::new(
        CannedHttpClient::new()
            .respond(Ok(chart("101.5", "102.75")))
            .respond(Ok(chart("101.5", "-3"))),
    );
    let source = YahooChartSource::new(client).with_fetched_at(datetime!(2024-03-01 18:00:00));
    let tickers = symbols(&["AI.PA", "OR.PA"]);
    let mut quarantine = Quarantine::new();
    DailyUpdate::new(&source, &warehouse, validator(), "run-4")
        .run(&tickers, &mut quarantine)
        .await;

    // When: The quarantine is flushed and the day is exported
    let quarantine_path = temp.path().join("unvalid_data.csv");
    let flushed = quarantine.flush_to(&quarantine_path).expect("flush");
    let export_path = temp.path().join("intraday_directory").join("Today_Data.csv");
    let report = export_day(&warehouse, &tickers, date!(2024 - 03 - 01), &export_path)
        .expect("export");

    // Then: The quarantine file holds the typed row with its tag
    assert_eq!(flushed, 1);
    let quarantined = fs::read_to_string(&quarantine_path).expect("read quarantine");
    let lines: Vec<&str> = quarantined.lines().collect();
    assert!(lines[0].starts_with("ticker,Date,Open"));
    assert!(lines[0].ends_with(",type_error"));
    assert!(lines[1].starts_with("OR.PA,2024-03-01,101.5,"));
    assert!(lines[1].ends_with(",Num val"));

    // Then: The export holds only the accepted ticker's row
    assert_eq!(report.rows, 1);
    let exported = fs::read_to_string(&export_path).expect("read export");
    assert!(exported.contains("AI.PA,2024-03-01,101.5,103.5,100.5,102.75,6000,0,0,2024-03-01 18:00:00"));
    assert!(!exported.contains("OR.PA"));
}
