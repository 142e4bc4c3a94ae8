//! Naver 日K线接口实现
//!
//! 对接 https://fchart.stock.naver.com/sise.nhn，响应为 EUC-KR 编码的 XML：
//! `<item data="20240102|78200|79800|78200|79600|17142847" />`

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use regex::Regex;
use reqwest::Client;

use crate::models::OhlcvRow;

/// 获取日K线
///
/// `count` 为向前请求的条数，结果再按 [start, end] 过滤
pub async fn fetch_daily(
    client: &Client,
    url: &str,
    code: &str,
    count: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OhlcvRow>> {
    let count = count.max(1).to_string();
    log::debug!("请求日K线: code={} count={}", code, count);

    let response = client
        .get(url)
        .query(&[
            ("symbol", code),
            ("timeframe", "day"),
            ("count", count.as_str()),
            ("requestType", "0"),
        ])
        .header("Referer", "https://finance.naver.com/")
        .header(
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        )
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("获取日K线失败: {}", response.status()));
    }

    let bytes = response.bytes().await?;
    let text = encoding_rs::EUC_KR.decode(&bytes).0.to_string();

    parse_sise_xml(&text, start, end)
}

/// 解析日K线 XML
pub fn parse_sise_xml(data: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<OhlcvRow>> {
    if !data.contains("<chartdata") {
        return Err(anyhow!("无效的日K线数据格式"));
    }

    let item_re = Regex::new(r#"<item\s+data="([^"]*)""#)?;
    let mut rows = Vec::new();

    for cap in item_re.captures_iter(data) {
        let raw = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let row = parse_item(raw).ok_or_else(|| anyhow!("无法解析日K线数据: {}", raw))?;
        if row.date >= start && row.date <= end {
            rows.push(row);
        }
    }

    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

/// 解析单条数据：日期|开|高|低|收|量
fn parse_item(raw: &str) -> Option<OhlcvRow> {
    let fields: Vec<&str> = raw.split('|').map(str::trim).collect();
    if fields.len() < 5 {
        return None;
    }

    Some(OhlcvRow {
        date: NaiveDate::parse_from_str(fields[0], "%Y%m%d").ok()?,
        open: fields[1].parse().ok()?,
        high: fields[2].parse().ok()?,
        low: fields[3].parse().ok()?,
        close: fields[4].parse().ok()?,
        volume: fields.get(5).and_then(|v| v.parse().ok()),
    })
}
