//! 当日指标计算
//!
//! 由最近两个交易日的K线计算收盘价、涨跌额、涨跌幅、最高/最低价和成交量

use crate::models::{OhlcvRow, PriceSnapshot};

/// 快照请求的回看天数（自然日），足以覆盖节假日
pub const SNAPSHOT_LOOKBACK_DAYS: i64 = 10;

/// 计算当日指标
///
/// 行数不足两行时返回 `None`，由调用方显示为“暂无数据”。
/// 前收盘价为 0 时涨跌幅记为 0。
pub fn compute_snapshot(rows: &[OhlcvRow]) -> Option<PriceSnapshot> {
    let [.., prior, last] = rows else {
        return None;
    };

    let close = last.close;
    let prior_close = prior.close;
    let change = close - prior_close;
    let change_rate = if prior_close != 0.0 {
        change / prior_close * 100.0
    } else {
        0.0
    };

    Some(PriceSnapshot {
        close,
        prior_close,
        change,
        change_rate,
        high: last.high,
        low: last.low,
        volume: last.volume,
        as_of: last.date,
    })
}
