//! 测试用数据源，不访问网络

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::MarketDataProvider;
use crate::models::{Market, OhlcvRow, SymbolEntry};

#[derive(Default)]
pub struct FakeProvider {
    symbol_calls: AtomicUsize,
    ohlcv_requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
    empty_markets: Vec<Market>,
    failing_codes: Vec<String>,
    single_row_codes: Vec<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_market(mut self, market: Market) -> Self {
        self.empty_markets.push(market);
        self
    }

    pub fn with_failing_code(mut self, code: &str) -> Self {
        self.failing_codes.push(code.to_string());
        self
    }

    pub fn with_single_row_code(mut self, code: &str) -> Self {
        self.single_row_codes.push(code.to_string());
        self
    }

    pub fn symbol_calls(&self) -> usize {
        self.symbol_calls.load(Ordering::SeqCst)
    }

    pub fn ohlcv_requests(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.ohlcv_requests.lock().unwrap().clone()
    }

    pub fn kospi_labels() -> Vec<String> {
        vec![
            "Samsung Electronics (005930)".to_string(),
            "SK hynix (000660)".to_string(),
        ]
    }

    pub fn kosdaq_labels() -> Vec<String> {
        vec![
            "EcoPro BM (247540)".to_string(),
            "Alteogen (196170)".to_string(),
        ]
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    async fn list_symbols(&self, market: Market) -> Result<Vec<SymbolEntry>> {
        self.symbol_calls.fetch_add(1, Ordering::SeqCst);
        if self.empty_markets.contains(&market) {
            return Ok(Vec::new());
        }
        let entries = match market {
            Market::Kospi => vec![
                SymbolEntry::new("005930", "Samsung Electronics", Some(400.0)),
                SymbolEntry::new("000660", "SK hynix", Some(100.0)),
            ],
            Market::Kosdaq => vec![
                SymbolEntry::new("247540", "EcoPro BM", Some(20.0)),
                SymbolEntry::new("196170", "Alteogen", Some(10.0)),
            ],
        };
        Ok(entries)
    }

    async fn ohlcv(&self, code: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<OhlcvRow>> {
        self.ohlcv_requests
            .lock()
            .unwrap()
            .push((code.to_string(), start, end));

        if self.failing_codes.iter().any(|c| c == code) {
            return Err(anyhow!("invalid code {}", code));
        }

        let rows: Vec<OhlcvRow> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| {
                let close = 100.0 + date.ordinal() as f64;
                OhlcvRow {
                    date,
                    open: close - 1.0,
                    high: close + 2.0,
                    low: close - 2.0,
                    close,
                    volume: Some(1000.0),
                }
            })
            .collect();

        if self.single_row_codes.iter().any(|c| c == code) {
            return Ok(rows.into_iter().rev().take(1).collect());
        }
        Ok(rows)
    }
}
