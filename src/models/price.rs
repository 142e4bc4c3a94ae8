//! 行情数据模型
//!
//! 定义日K线与当日指标快照

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日K线数据
///
/// 包含单日的 OHLCV 数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRow {
    /// 交易日期
    pub date: NaiveDate,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 收盘价
    pub close: f64,
    /// 成交量（数据源缺失时为空）
    pub volume: Option<f64>,
}

/// 当日指标快照
///
/// 由最近两个交易日计算得出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// 当日收盘价
    pub close: f64,
    /// 前一交易日收盘价
    pub prior_close: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_rate: f64,
    /// 当日最高价
    pub high: f64,
    /// 当日最低价
    pub low: f64,
    /// 当日成交量
    pub volume: Option<f64>,
    /// 基准日
    pub as_of: NaiveDate,
}

/// 日K线查询参数
#[derive(Debug, Deserialize)]
pub struct OhlcvQuery {
    /// 开始日期（YYYY-MM-DD）
    pub start: Option<NaiveDate>,
    /// 结束日期（YYYY-MM-DD）
    pub end: Option<NaiveDate>,
    /// 回看天数，未给出 start 时使用
    pub days: Option<u32>,
}
