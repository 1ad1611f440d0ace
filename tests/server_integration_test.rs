use astro_dash::domain::model::Signal;
use astro_dash::{DashboardConfig, DashboardServer};
use httpmock::prelude::*;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct RunningServer {
    base: String,
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<astro_dash::Result<()>>,
}

impl RunningServer {
    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

async fn start(quotes: &MockServer) -> RunningServer {
    let mut config = DashboardConfig::default();
    config.market.quote_base_url = quotes.base_url();
    config.scan.group = astro_dash::domain::model::SymbolGroup::Custom;
    config.scan.custom_symbols = vec!["NSE:SBIN".to_string(), "NSE:ITC".to_string()];

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel::<()>();
    let server = DashboardServer::from_config(&config).unwrap();
    let handle = tokio::spawn(server.serve_on(listener, async {
        let _ = rx.await;
    }));

    RunningServer {
        base,
        stop: Some(tx),
        handle,
    }
}

fn quote_mock(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path_contains("/v8/finance/chart/");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "chart": {"result": [{"indicators": {"quote": [{"close": [410.0]}]}}]}
            }));
    });
}

#[tokio::test]
async fn test_health_and_planets() {
    let quotes = MockServer::start();
    quote_mock(&quotes);
    let running = start(&quotes).await;

    let health: serde_json::Value = reqwest::get(format!("{}/health", running.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, serde_json::json!({"status": "ok"}));

    let planets: Vec<serde_json::Value> = reqwest::get(format!("{}/api/planets", running.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(planets.len(), 10);
    assert_eq!(planets[0]["planet"], "Sun");
    assert_eq!(planets[0]["glyph"], "☀️");
    assert!(planets
        .iter()
        .all(|p| p["strength"].as_f64().unwrap().abs() <= 1.0));

    running.shutdown().await;
}

#[tokio::test]
async fn test_api_signals_applies_query() {
    let quotes = MockServer::start();
    quote_mock(&quotes);
    let running = start(&quotes).await;

    let all_signals: Vec<&str> = Signal::DISPLAY_ORDER.iter().map(|s| s.code()).collect();
    let url = format!(
        "{}/api/signals?symbols=NSE:TCS,MCX:GOLD1!,NSE:INFY&min_confidence=0&signals={}",
        running.base,
        all_signals.join(",")
    );
    let board: serde_json::Value = reqwest::get(url).await.unwrap().json().await.unwrap();

    assert_eq!(board["processed"], 3);
    assert_eq!(board["filters"]["min_confidence"], 0);
    assert_eq!(board["filters"]["signals"].as_array().unwrap().len(), 6);
    for group in board["groups"].as_array().unwrap() {
        for card in group["cards"].as_array().unwrap() {
            assert_eq!(card["price"], "410.00");
        }
    }

    running.shutdown().await;
}

#[tokio::test]
async fn test_invalid_parameters_return_400() {
    let quotes = MockServer::start();
    quote_mock(&quotes);
    let running = start(&quotes).await;

    for query in ["min_confidence=33", "signals=MOON", "refresh=1", "group=crypto"] {
        let response = reqwest::get(format!("{}/api/signals?{}", running.base, query))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST, "{}", query);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "invalid_parameter");
        assert!(body["error"].as_str().unwrap().contains("Invalid value"));
    }

    running.shutdown().await;
}

#[tokio::test]
async fn test_dashboard_page() {
    let quotes = MockServer::start();
    quote_mock(&quotes);
    let running = start(&quotes).await;

    let response = reqwest::get(format!("{}/?live=false&min_confidence=0", running.base))
        .await
        .unwrap();
    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let page = response.text().await.unwrap();
    assert!(page.contains("🌌 Advanced Astro Trading Dashboard"));
    assert!(page.contains("Processed 2 symbols"));
    assert!(page.contains("<option value=\"custom\" selected>Custom Selection</option>"));
    assert!(page.contains("<option value=\"NSE:SBIN\" selected>NSE:SBIN</option>"));
    assert!(!page.contains("http-equiv=\"refresh\""));

    let live = reqwest::get(format!("{}/?refresh=30", running.base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(live.contains("<meta http-equiv=\"refresh\" content=\"30\">"));

    running.shutdown().await;
}
