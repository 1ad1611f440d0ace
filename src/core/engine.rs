use crate::core::scanner::Scanner;
use crate::domain::board::{Board, BoardFilters};
use crate::domain::ports::BoardSink;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_REFRESH_SECONDS: u64 = 60;
pub const MIN_REFRESH_SECONDS: u64 = 15;
pub const MAX_REFRESH_SECONDS: u64 = 300;

/// 要掃描的商品與看板篩選條件
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPlan {
    pub symbols: Vec<String>,
    pub filters: BoardFilters,
}

/// 掃描、組看板、交給輸出端
pub struct DashboardEngine<S: BoardSink> {
    scanner: Scanner,
    sink: S,
    monitor: SystemMonitor,
}

impl<S: BoardSink> DashboardEngine<S> {
    pub fn new(scanner: Scanner, sink: S) -> Self {
        Self::new_with_monitoring(scanner, sink, false)
    }

    pub fn new_with_monitoring(scanner: Scanner, sink: S, monitor_enabled: bool) -> Self {
        Self {
            scanner,
            sink,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run_once(&self, plan: &ScanPlan) -> Result<Board> {
        let report = self.scanner.run(&plan.symbols).await;
        let board = report.board(&plan.filters);
        tracing::info!("📋 {}", board.caption());

        self.sink.publish(&board).await?;
        self.monitor.log_scan(report.processed);
        Ok(board)
    }

    /// 每隔 `refresh` 重新掃描，直到 `shutdown` 完成；單次失敗只記錄不中斷
    ///
    /// 回傳完成的掃描次數，被中斷的那一次不算。
    pub async fn run_live<F>(&self, plan: &ScanPlan, refresh: Duration, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycles = 0usize;

        tracing::info!(
            "🔄 Live mode: {} symbols every {}s",
            plan.symbols.len(),
            refresh.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("🛑 Live mode stopped after {} scans", cycles);
                    break;
                }
                _ = ticker.tick() => {
                    // 掃描進行中也要能停下
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            tracing::info!("🛑 Live mode interrupted during scan {}", cycles + 1);
                            break;
                        }
                        result = self.run_once(plan) => {
                            cycles += 1;
                            if let Err(e) = result {
                                tracing::error!("❌ Scan {} failed: {}", cycles, e.user_friendly_message());
                            }
                        }
                    }
                }
            }
        }

        self.monitor.log_final_stats();
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::{Observer, StrengthCalculator};
    use crate::domain::model::Signal;
    use crate::domain::ports::PriceSource;
    use crate::utils::error::DashError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct FlatPrices;

    #[async_trait]
    impl PriceSource for FlatPrices {
        async fn last_price(&self, _symbol: &str) -> f64 {
            100.0
        }
    }

    struct StalledPrices;

    #[async_trait]
    impl PriceSource for StalledPrices {
        async fn last_price(&self, _symbol: &str) -> f64 {
            tokio::time::sleep(Duration::from_secs(3)).await;
            100.0
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        boards: Arc<Mutex<Vec<Board>>>,
        fail_every_other: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BoardSink for RecordingSink {
        async fn publish(&self, board: &Board) -> Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_every_other && call % 2 == 0 {
                return Err(DashError::ServerError {
                    message: "sink unavailable".to_string(),
                });
            }
            self.boards.lock().await.push(board.clone());
            Ok(())
        }
    }

    fn engine_with(prices: Arc<dyn PriceSource>, sink: RecordingSink) -> DashboardEngine<RecordingSink> {
        let scanner = Scanner::new(
            prices,
            Arc::new(StrengthCalculator::new(Observer::default())),
            4,
        );
        DashboardEngine::new(scanner, sink)
    }

    fn engine(sink: RecordingSink) -> DashboardEngine<RecordingSink> {
        engine_with(Arc::new(FlatPrices), sink)
    }

    fn plan() -> ScanPlan {
        ScanPlan {
            symbols: vec!["NSE:SBIN".to_string(), "NSE:ITC".to_string()],
            filters: BoardFilters {
                min_confidence: 0,
                signals: Signal::DISPLAY_ORDER.to_vec(),
            },
        }
    }

    #[tokio::test]
    async fn test_run_once_publishes_board() {
        let sink = RecordingSink::default();
        let engine = engine(sink.clone());

        let board = tokio_test::assert_ok!(engine.run_once(&plan()).await);

        assert_eq!(board.processed, 2);
        let published = sink.boards.lock().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0], board);
    }

    #[tokio::test]
    async fn test_run_once_propagates_sink_errors() {
        let sink = RecordingSink {
            fail_every_other: true,
            ..Default::default()
        };
        let engine = engine(sink);
        tokio_test::assert_err!(engine.run_once(&plan()).await);
    }

    #[tokio::test]
    async fn test_run_live_survives_failures_until_shutdown() {
        let sink = RecordingSink {
            fail_every_other: true,
            ..Default::default()
        };
        let engine = engine(sink.clone());

        let cycles = engine
            .run_live(
                &plan(),
                Duration::from_millis(20),
                tokio::time::sleep(Duration::from_millis(150)),
            )
            .await;

        assert!(cycles >= 3, "only {} cycles", cycles);
        let published = sink.boards.lock().await.len();
        assert_eq!(published, cycles / 2);
    }

    #[tokio::test]
    async fn test_run_live_stops_immediately_when_already_cancelled() {
        let sink = RecordingSink::default();
        let engine = engine(sink.clone());

        let cycles = engine
            .run_live(&plan(), Duration::from_secs(60), std::future::ready(()))
            .await;

        assert_eq!(cycles, 0);
        assert!(sink.boards.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_live_stops_during_slow_scan() {
        let sink = RecordingSink::default();
        let engine = engine_with(Arc::new(StalledPrices), sink.clone());
        let started = std::time::Instant::now();

        let cycles = engine
            .run_live(
                &plan(),
                Duration::from_secs(60),
                tokio::time::sleep(Duration::from_millis(100)),
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
        assert_eq!(cycles, 0);
        assert!(sink.boards.lock().await.is_empty());
    }
}
