//! 行情数据服务
//!
//! 三个带缓存的访问器：股票列表、日K线区间、当日指标快照
//!
//! ## 数据来源
//! - KRX：股票列表（含市值）
//! - Naver：日K线
//!
//! 数据源封装在 `MarketDataProvider` 之后，`MarketData` 负责缓存和错误降级。

mod krx;
mod naver;

#[cfg(test)]
pub mod fake;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use std::sync::Arc;

use crate::config::{CacheConfig, ProviderConfig};
use crate::error::{DashboardError, DashboardResult};
use crate::models::{seoul_today, Market, OhlcvRow, PriceSnapshot, SymbolEntry};
use crate::services::cache::TtlCache;
use crate::services::snapshot::{compute_snapshot, SNAPSHOT_LOOKBACK_DAYS};

/// 行情数据源
#[async_trait]
pub trait MarketDataProvider: Send + Sync + 'static {
    /// 市场股票列表，按市值降序（无市值时按名称）
    async fn list_symbols(&self, market: Market) -> Result<Vec<SymbolEntry>>;

    /// 日K线，按日期升序，可以为空
    async fn ohlcv(&self, code: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<OhlcvRow>>;
}

/// KRX + Naver 数据源
pub struct KrxNaverProvider {
    /// HTTP 客户端
    client: Client,
    config: ProviderConfig,
}

impl KrxNaverProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MarketDataProvider for KrxNaverProvider {
    async fn list_symbols(&self, market: Market) -> Result<Vec<SymbolEntry>> {
        krx::fetch_listing(&self.client, &self.config.krx_url, market, seoul_today()).await
    }

    async fn ohlcv(&self, code: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<OhlcvRow>> {
        // 接口只能从最新交易日向前取 count 条
        let count = (seoul_today().max(end) - start).num_days() + 1;
        naver::fetch_daily(&self.client, &self.config.naver_url, code, count, start, end).await
    }
}

/// 带缓存的行情访问器
pub struct MarketData {
    provider: Arc<dyn MarketDataProvider>,
    symbols: TtlCache<Market, Vec<SymbolEntry>>,
    ohlcv: TtlCache<(String, NaiveDate, NaiveDate), Vec<OhlcvRow>>,
    snapshots: TtlCache<(String, NaiveDate), Option<PriceSnapshot>>,
}

impl MarketData {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: &CacheConfig) -> Self {
        Self {
            provider,
            symbols: TtlCache::new("symbols", cache.symbols_ttl()),
            ohlcv: TtlCache::new("ohlcv", cache.ohlcv_ttl()),
            snapshots: TtlCache::new("snapshot", cache.snapshot_ttl()),
        }
    }

    /// 股票列表，为空时视为数据不可用且不缓存
    pub async fn symbols(&self, market: Market) -> DashboardResult<Vec<SymbolEntry>> {
        let provider = &self.provider;
        self.symbols
            .get_or_fetch(market, move || async move {
                let entries = provider
                    .list_symbols(market)
                    .await
                    .map_err(DashboardError::unavailable)?;
                if entries.is_empty() {
                    return Err(DashboardError::DataUnavailable(format!(
                        "{} 股票列表为空",
                        market
                    )));
                }
                Ok(entries)
            })
            .await
    }

    /// 股票标签列表，获取失败时返回空列表
    pub async fn labels(&self, market: Market) -> Vec<String> {
        match self.symbols(market).await {
            Ok(entries) => entries.into_iter().map(|e| e.label).collect(),
            Err(e) => {
                log::warn!("获取 {} 股票列表失败: {}", market, e);
                Vec::new()
            }
        }
    }

    /// 日K线区间
    pub async fn ohlcv(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DashboardResult<Vec<OhlcvRow>> {
        let provider = &self.provider;
        self.ohlcv
            .get_or_fetch((code.to_string(), start, end), move || async move {
                provider
                    .ohlcv(code, start, end)
                    .await
                    .map_err(DashboardError::unavailable)
            })
            .await
    }

    /// 当日指标快照，行数不足或请求失败时返回 `None`
    pub async fn snapshot(&self, code: &str, today: NaiveDate) -> Option<PriceSnapshot> {
        let provider = &self.provider;
        let result = self
            .snapshots
            .get_or_fetch((code.to_string(), today), move || async move {
                let start = today - Duration::days(SNAPSHOT_LOOKBACK_DAYS);
                let rows = provider
                    .ohlcv(code, start, today)
                    .await
                    .map_err(DashboardError::unavailable)?;
                Ok::<_, DashboardError>(compute_snapshot(&rows))
            })
            .await;

        match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("获取 {} 快照失败: {}", code, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeProvider;
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_symbols_cached() {
        println!("\n========== 测试股票列表缓存 ==========");
        let provider = Arc::new(FakeProvider::new());
        let data = MarketData::new(provider.clone(), &CacheConfig::default());

        let first = data.symbols(Market::Kospi).await.unwrap();
        let second = data.symbols(Market::Kospi).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.symbol_calls(), 1);

        data.symbols(Market::Kosdaq).await.unwrap();
        assert_eq!(provider.symbol_calls(), 2);
        println!("✅ 股票列表缓存测试通过！");
    }

    #[tokio::test]
    async fn test_empty_directory_is_unavailable() {
        let provider = Arc::new(FakeProvider::new().with_empty_market(Market::Kosdaq));
        let data = MarketData::new(provider.clone(), &CacheConfig::default());

        let err = data.symbols(Market::Kosdaq).await.unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable(_)));
        assert!(data.labels(Market::Kosdaq).await.is_empty());
        // 失败不缓存
        assert_eq!(provider.symbol_calls(), 2);
    }

    #[tokio::test]
    async fn test_ohlcv_cached_per_range() {
        let provider = Arc::new(FakeProvider::new());
        let data = MarketData::new(provider.clone(), &CacheConfig::default());

        data.ohlcv("005930", date(1), date(10)).await.unwrap();
        data.ohlcv("005930", date(1), date(10)).await.unwrap();
        data.ohlcv("005930", date(2), date(10)).await.unwrap();

        assert_eq!(provider.ohlcv_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_degrades() {
        println!("\n========== 测试快照降级 ==========");
        let provider = Arc::new(
            FakeProvider::new()
                .with_failing_code("999999")
                .with_single_row_code("111111"),
        );
        let data = MarketData::new(provider.clone(), &CacheConfig::default());

        assert!(data.snapshot("999999", date(10)).await.is_none());
        assert!(data.snapshot("111111", date(10)).await.is_none());

        let snap = data.snapshot("005930", date(10)).await.unwrap();
        assert_eq!(snap.as_of, date(10));

        let (_, start, end) = provider.ohlcv_requests().last().cloned().unwrap();
        assert_eq!(end, date(10));
        assert_eq!((end - start).num_days(), SNAPSHOT_LOOKBACK_DAYS);
        println!("✅ 快照降级测试通过！");
    }
}
