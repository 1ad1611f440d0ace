use crate::domain::ports::PriceSource;
use crate::utils::error::{DashError, Result};
use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(60);
/// moka 對過長的 TTL 會 panic，報價快取最多保留一天
pub const MAX_QUOTE_TTL: Duration = Duration::from_secs(86_400);
const QUOTE_CACHE_CAPACITY: u64 = 4_096;

/// 交易所前綴與衍生後綴去掉後的代號，例如 `NSE:BAJAJ-AUTO` 變成 `BAJAJ`
pub fn clean_symbol(symbol: &str) -> String {
    let tail = symbol.rsplit(':').next().unwrap_or(symbol);
    let tail = tail.split('-').next().unwrap_or(tail);
    let tail = tail.split('/').next().unwrap_or(tail);
    tail.replace('^', "")
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResponse {
    fn last_close(self) -> Option<f64> {
        self.chart
            .result?
            .into_iter()
            .next()?
            .indicators
            .quote
            .into_iter()
            .next()?
            .close
            .into_iter()
            .rev()
            .flatten()
            .find(|price| price.is_finite())
    }
}

/// Yahoo chart API 的一分鐘 K 線，取最後一筆收盤價
pub struct YahooQuoteSource {
    client: Client,
    base_url: Url,
    cache: Cache<String, f64>,
}

impl YahooQuoteSource {
    pub fn new(base_url: &str, timeout: Duration, ttl: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DashError::invalid_value("market.quote_base_url", base_url, e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashError::invalid_value(
                "market.quote_base_url",
                base_url,
                "URL cannot be used as a base",
            ));
        }

        if ttl > MAX_QUOTE_TTL {
            return Err(DashError::invalid_value(
                "market.cache_ttl_seconds",
                ttl.as_secs(),
                format!("Value must be at most {}", MAX_QUOTE_TTL.as_secs()),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(QUOTE_CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Ok(Self {
            client,
            base_url,
            cache,
        })
    }

    pub fn chart_url(&self, symbol: &str) -> Result<Url> {
        let ticker = clean_symbol(symbol);
        if ticker.is_empty() {
            return Err(DashError::QuoteError {
                symbol: symbol.to_string(),
                message: "symbol is empty after cleaning".to_string(),
            });
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DashError::QuoteError {
                symbol: symbol.to_string(),
                message: "quote base URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker.as_str()]);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1m");
        Ok(url)
    }

    async fn fetch(&self, symbol: &str) -> Result<f64> {
        let url = self.chart_url(symbol)?;
        tracing::debug!("Requesting quote for {} from {}", symbol, url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashError::QuoteError {
                symbol: symbol.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let chart: ChartResponse = response.json().await?;
        chart.last_close().ok_or_else(|| DashError::QuoteError {
            symbol: symbol.to_string(),
            message: "no closing prices in response".to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for YahooQuoteSource {
    async fn last_price(&self, symbol: &str) -> f64 {
        // 同一代號的並行請求只打一次；失敗也快取 0.0，避免同一個 TTL 內反覆打同一個壞代號
        self.cache
            .get_with(symbol.to_string(), async {
                match self.fetch(symbol).await {
                    Ok(price) => price,
                    Err(e) => {
                        tracing::warn!("⚠️ Price fetch failed for {}: {}", symbol, e);
                        0.0
                    }
                }
            })
            .await
    }
}
