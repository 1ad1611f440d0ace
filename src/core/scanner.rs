use crate::astro::StrengthCalculator;
use crate::domain::board::{Board, BoardFilters};
use crate::domain::mapping::planet_for;
use crate::domain::model::SignalCard;
use crate::domain::ports::PriceSource;
use crate::domain::signal::{calculate_signal, transit_alert};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_WORKERS: usize = 16;

/// 一次掃描的結果與耗時
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub cards: Vec<SignalCard>,
    pub processed: usize,
    pub elapsed: Duration,
    pub generated_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn board(&self, filters: &BoardFilters) -> Board {
        Board::build(
            &self.cards,
            filters,
            self.processed,
            self.elapsed,
            self.generated_at,
        )
    }
}

pub struct Scanner {
    prices: Arc<dyn PriceSource>,
    strengths: Arc<StrengthCalculator>,
    max_workers: usize,
}

impl Scanner {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        strengths: Arc<StrengthCalculator>,
        max_workers: usize,
    ) -> Self {
        Self {
            prices,
            strengths,
            max_workers: max_workers.max(1),
        }
    }

    pub fn strengths(&self) -> &Arc<StrengthCalculator> {
        &self.strengths
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub async fn evaluate(&self, symbol: &str, at: DateTime<Utc>) -> SignalCard {
        let planet = planet_for(symbol);
        let reading = self.strengths.reading(planet, at);
        let price = self.prices.last_price(symbol).await;
        let (signal, reason) = calculate_signal(reading.strength, planet);
        let next_transit = reading.next_transit_label();

        SignalCard {
            symbol: symbol.to_string(),
            price,
            signal,
            reason: reason.to_string(),
            strength: reading.strength,
            planet,
            transit: transit_alert(planet, &next_transit, &reading.prev_transit_label()),
            next_transit,
        }
    }

    /// 所有商品共用同一個時間點；結果依強度由高到低排序，同分保持輸入順序
    pub async fn scan(&self, symbols: &[String], at: DateTime<Utc>) -> Vec<SignalCard> {
        let mut cards: Vec<SignalCard> = stream::iter(symbols.iter().cloned())
            .map(|symbol| async move { self.evaluate(&symbol, at).await })
            .buffered(self.max_workers)
            .collect()
            .await;

        cards.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        cards
    }

    pub async fn run(&self, symbols: &[String]) -> ScanReport {
        let started = Instant::now();
        let generated_at = Utc::now();
        tracing::debug!(
            "🔭 Scanning {} symbols with {} workers",
            symbols.len(),
            self.max_workers
        );

        let cards = self.scan(symbols, generated_at).await;
        let elapsed = started.elapsed();
        tracing::info!(
            "✅ Scan completed: {} symbols in {:.2}s",
            cards.len(),
            elapsed.as_secs_f64()
        );

        ScanReport {
            processed: cards.len(),
            cards,
            elapsed,
            generated_at,
        }
    }
}
