use crate::domain::board::Board;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 最新成交價來源；取不到價格時回傳 0.0
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn last_price(&self, symbol: &str) -> f64;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 每次掃描完成後接收看板的輸出端
#[async_trait]
pub trait BoardSink: Send + Sync {
    async fn publish(&self, board: &Board) -> Result<()>;
}
