//! KRX 股票列表接口实现
//!
//! 对接 http://data.krx.co.kr 的全部股票行情页（MDCSTAT01501），
//! 按市值降序排列，无市值时按名称排序

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use reqwest::Client;
use std::cmp::Ordering;

use crate::models::{Market, SymbolEntry};

const KRX_BLD: &str = "dbms/MDC/STAT/standard/MDCSTAT01501";
const CODE_FIELD: &str = "ISU_SRT_CD";
const NAME_FIELD: &str = "ISU_ABBRV";
/// 市值字段候选
const CAP_FIELDS: [&str; 2] = ["MKTCAP", "MKT_CAP"];
/// 遇到休市日时最多向前查找的天数
const MAX_LOOKBACK_DAYS: i64 = 7;

/// 获取市场股票列表
///
/// 休市日 KRX 返回空列表，此时向前查找最近的交易日
pub async fn fetch_listing(
    client: &Client,
    url: &str,
    market: Market,
    today: NaiveDate,
) -> Result<Vec<SymbolEntry>> {
    let mut day = today;

    for _ in 0..MAX_LOOKBACK_DAYS {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let trd_dd = day.format("%Y%m%d").to_string();
            log::debug!("请求 KRX 股票列表: market={} trdDd={}", market, trd_dd);

            let response = client
                .post(url)
                .form(&[
                    ("bld", KRX_BLD),
                    ("mktId", market.krx_id()),
                    ("trdDd", trd_dd.as_str()),
                    ("share", "1"),
                    ("money", "1"),
                    ("csvxls_isNo", "false"),
                ])
                .header("Referer", "http://data.krx.co.kr/contents/MDC/MDI/mdiLoader/index.cmd")
                .header(
                    "User-Agent",
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
                )
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(anyhow!("获取股票列表失败: {}", response.status()));
            }

            let json: serde_json::Value = response.json().await?;
            let entries = parse_listing(&json)?;
            if !entries.is_empty() {
                log::info!("{} 股票列表共 {} 条 ({})", market, entries.len(), trd_dd);
                return Ok(entries);
            }
        }
        day -= Duration::days(1);
    }

    Ok(Vec::new())
}

/// 解析 KRX 列表响应
///
/// 缺少代码或名称字段时返回错误
pub fn parse_listing(json: &serde_json::Value) -> Result<Vec<SymbolEntry>> {
    let rows = json["OutBlock_1"]
        .as_array()
        .ok_or_else(|| anyhow!("列表响应缺少 OutBlock_1"))?;

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    for field in [CODE_FIELD, NAME_FIELD] {
        if first.get(field).is_none() {
            let columns: Vec<&str> = first
                .as_object()
                .map(|o| o.keys().map(|k| k.as_str()).collect())
                .unwrap_or_default();
            return Err(anyhow!("列表结果缺少 '{}' 字段, columns={:?}", field, columns));
        }
    }

    let cap_field = CAP_FIELDS.iter().copied().find(|f| first.get(*f).is_some());

    let mut entries: Vec<SymbolEntry> = rows
        .iter()
        .filter_map(|row| {
            let code = row[CODE_FIELD].as_str().map(str::trim).filter(|s| !s.is_empty())?;
            let name = row[NAME_FIELD].as_str().map(str::trim).filter(|s| !s.is_empty())?;
            let cap = cap_field.and_then(|f| parse_number(&row[f]));
            Some(SymbolEntry::new(code, name, cap))
        })
        .collect();

    if cap_field.is_some() {
        entries.sort_by(compare_by_cap);
    } else {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    Ok(entries)
}

/// 市值降序，无法解析的排在最后，其次按名称升序
fn compare_by_cap(a: &SymbolEntry, b: &SymbolEntry) -> Ordering {
    let by_cap = match (a.market_cap, b.market_cap) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_cap.then_with(|| a.name.cmp(&b.name))
}

/// 解析带千分位逗号的数字
fn parse_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing_sorted_by_cap() {
        println!("\n========== 测试解析 KRX 股票列表 ==========");
        let data = json!({
            "OutBlock_1": [
                {"ISU_SRT_CD": "035420", "ISU_ABBRV": "NAVER", "MKTCAP": "30,000"},
                {"ISU_SRT_CD": "005930", "ISU_ABBRV": "Samsung Electronics", "MKTCAP": "400,000"},
                {"ISU_SRT_CD": "000001", "ISU_ABBRV": "Broken", "MKTCAP": "-"},
                {"ISU_SRT_CD": "000660", "ISU_ABBRV": "SK hynix", "MKTCAP": "100,000"},
                {"ISU_SRT_CD": "000002", "ISU_ABBRV": "Alpha", "MKTCAP": "100,000"},
                {"ISU_SRT_CD": "", "ISU_ABBRV": "NoCode", "MKTCAP": "1"}
            ]
        });

        let entries = parse_listing(&data).unwrap();
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        println!("  {:?}", labels);

        assert_eq!(
            labels,
            vec![
                "Samsung Electronics (005930)",
                "Alpha (000002)",
                "SK hynix (000660)",
                "NAVER (035420)",
                "Broken (000001)",
            ]
        );
        assert_eq!(entries[0].market_cap, Some(400_000.0));
        println!("✅ KRX 股票列表解析测试通过！");
    }

    #[test]
    fn test_parse_listing_without_cap_sorts_by_name() {
        let data = json!({
            "OutBlock_1": [
                {"ISU_SRT_CD": "2", "ISU_ABBRV": "Beta"},
                {"ISU_SRT_CD": "1", "ISU_ABBRV": "Alpha"}
            ]
        });

        let entries = parse_listing(&data).unwrap();
        assert_eq!(entries[0].name, "Alpha");
        assert_eq!(entries[1].name, "Beta");
        assert!(entries[0].market_cap.is_none());
    }

    #[test]
    fn test_parse_listing_missing_column() {
        let data = json!({"OutBlock_1": [{"ISU_SRT_CD": "005930"}]});
        let err = parse_listing(&data).unwrap_err();
        assert!(err.to_string().contains(NAME_FIELD));

        let data = json!({"error": "x"});
        assert!(parse_listing(&data).is_err());
    }

    #[test]
    fn test_parse_listing_empty() {
        let data = json!({"OutBlock_1": []});
        assert!(parse_listing(&data).unwrap().is_empty());
    }
}
