use astro_dash::adapters::export::{CSV_ENTRY, JSON_ENTRY, SNAPSHOT_FILE};
use astro_dash::domain::model::{Signal, SignalRow, SymbolGroup};
use astro_dash::{DashboardConfig, DashboardEngine, LocalStorage, ZipExportSink};
use httpmock::prelude::*;
use std::io::Read;
use tempfile::TempDir;

fn chart_body(close: f64) -> serde_json::Value {
    serde_json::json!({
        "chart": {
            "result": [{"indicators": {"quote": [{"close": [close - 1.0, close, null]}]}}],
            "error": null
        }
    })
}

fn config_for(server: &MockServer, output: &TempDir) -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.market.quote_base_url = server.base_url();
    config.scan.group = SymbolGroup::Custom;
    config.scan.custom_symbols = vec![
        "NSE:SBIN".to_string(),
        "NSE:BAJAJ-AUTO".to_string(),
        "MCX:GOLD1!".to_string(),
    ];
    config.filters.min_confidence = 0;
    config.filters.signals = Signal::DISPLAY_ORDER
        .iter()
        .map(|s| s.code().to_string())
        .collect();
    config.export.output_path = output.path().to_string_lossy().to_string();
    config
}

#[tokio::test]
async fn test_export_snapshot_end_to_end() {
    let output = TempDir::new().unwrap();
    let server = MockServer::start();
    let quotes = server.mock(|when, then| {
        when.method(GET).path_contains("/v8/finance/chart/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(chart_body(1234.5));
    });

    let config = config_for(&server, &output);
    let plan = config.scan_plan().unwrap();
    assert_eq!(plan.symbols.len(), 3);

    let engine = DashboardEngine::new(
        config.scanner().unwrap(),
        ZipExportSink::new(LocalStorage::new(&config.export.output_path)),
    );
    let board = engine.run_once(&plan).await.unwrap();

    // 三個商品各查一次報價，第二次掃描走快取
    quotes.assert_hits(3);
    engine.run_once(&plan).await.unwrap();
    quotes.assert_hits(3);

    assert_eq!(board.processed, 3);
    assert!(board.cards().all(|card| card.price == 1234.5));
    assert!(board.cards().all(|card| card.strength >= 0.0));

    let zip_path = output.path().join(SNAPSHOT_FILE);
    let mut archive = zip::ZipArchive::new(std::fs::File::open(zip_path).unwrap()).unwrap();

    let mut csv_text = String::new();
    archive
        .by_name(CSV_ENTRY)
        .unwrap()
        .read_to_string(&mut csv_text)
        .unwrap();
    let rows: Vec<SignalRow> = csv::Reader::from_reader(csv_text.as_bytes())
        .deserialize()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), board.shown);
    assert!(rows.iter().all(|row| row.price == "1,234.50"));

    let mut json_text = String::new();
    archive
        .by_name(JSON_ENTRY)
        .unwrap()
        .read_to_string(&mut json_text)
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(json["processed"], 3);
    assert_eq!(json["filters"]["min_confidence"], 0);
}

#[tokio::test]
async fn test_failed_quotes_still_produce_a_board() {
    let output = TempDir::new().unwrap();
    let server = MockServer::start();
    let quotes = server.mock(|when, then| {
        when.method(GET).path_contains("/v8/finance/chart/");
        then.status(404);
    });

    let config = config_for(&server, &output);
    let engine = DashboardEngine::new(
        config.scanner().unwrap(),
        ZipExportSink::new(LocalStorage::new(&config.export.output_path)),
    );
    let board = engine.run_once(&config.scan_plan().unwrap()).await.unwrap();

    quotes.assert_hits(3);
    assert_eq!(board.processed, 3);
    assert!(board.cards().all(|card| card.price_display() == "N/A"));
    assert!(output.path().join(SNAPSHOT_FILE).exists());
}
