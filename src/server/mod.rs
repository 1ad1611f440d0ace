//! 儀表板 HTTP 服務：HTML 頁面與 JSON API
//!
//! 每個請求都以當下時間重新掃描；報價由報價來源自己的 TTL 快取吸收。

use crate::config::toml_config::DashboardConfig;
use crate::core::engine::{MAX_REFRESH_SECONDS, MIN_REFRESH_SECONDS};
use crate::core::scanner::Scanner;
use crate::domain::board::{Board, BoardFilters, CONFIDENCE_STEP};
use crate::domain::model::{format_confidence, Planet, Signal, SymbolGroup};
use crate::domain::symbols::SymbolUniverse;
use crate::render::html::{render_page, PageControls};
use crate::utils::error::{DashError, ErrorCategory, Result};
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::{validate_range, validate_step};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// 未帶參數時頁面使用的設定
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDefaults {
    pub group: SymbolGroup,
    pub custom_symbols: Vec<String>,
    pub filters: BoardFilters,
    pub live: bool,
    pub refresh_seconds: u64,
}

impl ViewDefaults {
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Ok(Self {
            group: config.scan.group,
            custom_symbols: config.scan.custom_symbols.clone(),
            filters: config.board_filters()?,
            live: config.live.enabled,
            refresh_seconds: config.live.refresh_seconds,
        })
    }
}

/// 查詢參數；清單可用逗號分隔，也可重複同一個鍵
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub group: Option<SymbolGroup>,
    pub symbols: Vec<String>,
    pub min_confidence: Option<u8>,
    pub signals: Vec<Signal>,
    pub live: Option<bool>,
    pub refresh: Option<u64>,
}

impl DashboardQuery {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "group" => query.group = Some(value.parse()?),
                "symbols" => query.symbols.extend(split_list(value)),
                "min_confidence" => {
                    let confidence: u8 = value.parse().map_err(|_| {
                        DashError::invalid_value("min_confidence", value, "expected an integer")
                    })?;
                    validate_range("min_confidence", confidence, 0, 100)?;
                    validate_step("min_confidence", confidence, CONFIDENCE_STEP)?;
                    query.min_confidence = Some(confidence);
                }
                "signals" => {
                    for code in split_list(value) {
                        let signal: Signal = code.parse()?;
                        if !query.signals.contains(&signal) {
                            query.signals.push(signal);
                        }
                    }
                }
                // 表單會先送隱藏的 false，勾選時再送 true，取最後一個
                "live" => query.live = Some(parse_bool("live", value)?),
                "refresh" => {
                    let refresh: u64 = value.parse().map_err(|_| {
                        DashError::invalid_value("refresh", value, "expected seconds as an integer")
                    })?;
                    validate_range("refresh", refresh, MIN_REFRESH_SECONDS, MAX_REFRESH_SECONDS)?;
                    query.refresh = Some(refresh);
                }
                other => tracing::debug!("Ignoring unknown query parameter '{}'", other),
            }
        }
        Ok(query)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(DashError::invalid_value(field, value, "expected true or false")),
    }
}

/// 預設值套上查詢參數後實際要掃描的內容
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub group: SymbolGroup,
    pub custom: Vec<String>,
    pub symbols: Vec<String>,
    pub filters: BoardFilters,
    pub live: bool,
    pub refresh_seconds: u64,
}

impl DashboardView {
    pub fn resolve(query: DashboardQuery, defaults: &ViewDefaults, universe: &SymbolUniverse) -> Self {
        let group = match query.group {
            Some(group) => group,
            None if !query.symbols.is_empty() => SymbolGroup::Custom,
            None => defaults.group,
        };
        let custom = if query.symbols.is_empty() {
            defaults.custom_symbols.clone()
        } else {
            query.symbols
        };
        let custom = if group == SymbolGroup::Custom && custom.is_empty() {
            universe.default_custom()
        } else {
            custom
        };

        Self {
            group,
            symbols: universe.group(group, &custom),
            custom,
            filters: BoardFilters {
                min_confidence: query
                    .min_confidence
                    .unwrap_or(defaults.filters.min_confidence),
                signals: if query.signals.is_empty() {
                    defaults.filters.signals.clone()
                } else {
                    query.signals
                },
            },
            live: query.live.unwrap_or(defaults.live),
            refresh_seconds: query.refresh.unwrap_or(defaults.refresh_seconds),
        }
    }
}

pub struct DashboardState {
    scanner: Scanner,
    universe: SymbolUniverse,
    all_symbols: Vec<String>,
    defaults: ViewDefaults,
    monitor: SystemMonitor,
}

impl DashboardState {
    async fn board(&self, view: &DashboardView) -> Board {
        let report = self.scanner.run(&view.symbols).await;
        self.monitor.log_scan(report.processed);
        report.board(&view.filters)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

/// 參數錯誤回 400，其餘回 500
#[derive(Debug)]
pub struct ApiError(DashError);

impl From<DashError> for ApiError {
    fn from(error: DashError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self.0.category() {
            ErrorCategory::Configuration => (StatusCode::BAD_REQUEST, "invalid_parameter"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct PlanetStatus {
    pub planet: Planet,
    pub glyph: &'static str,
    pub strength: f64,
    pub confidence: String,
    pub next_transit: String,
    pub prev_transit: String,
}

pub struct DashboardServer {
    state: Arc<DashboardState>,
}

impl DashboardServer {
    pub fn new(
        scanner: Scanner,
        universe: SymbolUniverse,
        defaults: ViewDefaults,
        monitor_enabled: bool,
    ) -> Self {
        let all_symbols = universe.all();
        Self {
            state: Arc::new(DashboardState {
                scanner,
                universe,
                all_symbols,
                defaults,
                monitor: SystemMonitor::new(monitor_enabled),
            }),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Ok(Self::new(
            config.scanner()?,
            config.universe()?,
            ViewDefaults::from_config(config)?,
            config.monitoring.enabled,
        ))
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/api/signals", get(api_signals))
            .route("/api/planets", get(api_planets))
            .route("/health", get(health))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("🚀 Dashboard listening on http://{}", addr);
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        self.state.monitor.log_final_stats();
        tracing::info!("👋 Dashboard stopped");
        Ok(())
    }

    pub async fn serve_with_shutdown<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DashError::ServerError {
                message: format!("cannot bind {}: {}", addr, e),
            })?;
        self.serve_on(listener, shutdown).await
    }
}

type Pairs = Query<Vec<(String, String)>>;

async fn index(
    State(state): State<Arc<DashboardState>>,
    Query(pairs): Pairs,
) -> std::result::Result<Html<String>, ApiError> {
    let query = DashboardQuery::from_pairs(&pairs)?;
    let view = DashboardView::resolve(query, &state.defaults, &state.universe);
    let board = state.board(&view).await;

    let controls = PageControls {
        group: view.group,
        custom: &view.custom,
        available: &state.all_symbols,
        live: view.live,
        refresh_seconds: view.refresh_seconds,
    };
    Ok(Html(render_page(&board, &controls)))
}

async fn api_signals(
    State(state): State<Arc<DashboardState>>,
    Query(pairs): Pairs,
) -> std::result::Result<Json<Board>, ApiError> {
    let query = DashboardQuery::from_pairs(&pairs)?;
    let view = DashboardView::resolve(query, &state.defaults, &state.universe);
    Ok(Json(state.board(&view).await))
}

async fn api_planets(State(state): State<Arc<DashboardState>>) -> Json<Vec<PlanetStatus>> {
    let now = Utc::now();
    let strengths = state.scanner.strengths();
    let planets = Planet::ALL
        .into_iter()
        .map(|planet| {
            let reading = strengths.reading(planet, now);
            PlanetStatus {
                planet,
                glyph: planet.glyph(),
                strength: reading.strength,
                confidence: format_confidence(reading.strength),
                next_transit: reading.next_transit_label(),
                prev_transit: reading.prev_transit_label(),
            }
        })
        .collect();
    Json(planets)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
