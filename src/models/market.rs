//! 市场与代码表模型
//!
//! 定义市场枚举、K线颜色枚举以及代码表条目

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 交易市场
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    /// 韩国综合股价指数市场
    #[default]
    Kospi,
    /// 韩国创业板市场
    Kosdaq,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Kospi, Market::Kosdaq];

    /// 显示名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
        }
    }

    /// KRX 列表接口使用的市场 ID
    pub fn krx_id(&self) -> &'static str {
        match self {
            Market::Kospi => "STK",
            Market::Kosdaq => "KSQ",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KOSPI" => Ok(Market::Kospi),
            "KOSDAQ" => Ok(Market::Kosdaq),
            other => Err(format!("未知市场: {}", other)),
        }
    }
}

/// K线颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleColor {
    Blue,
    Green,
    Red,
    Pink,
}

impl CandleColor {
    /// 上涨K线可选颜色
    pub const UP_CHOICES: [CandleColor; 3] = [CandleColor::Blue, CandleColor::Green, CandleColor::Red];
    /// 下跌K线可选颜色
    pub const DOWN_CHOICES: [CandleColor; 3] = [CandleColor::Pink, CandleColor::Red, CandleColor::Blue];

    pub fn hex(&self) -> &'static str {
        match self {
            CandleColor::Blue => "#2962ff",
            CandleColor::Green => "#00c853",
            CandleColor::Red => "#ff1744",
            CandleColor::Pink => "#e91e63",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandleColor::Blue => "blue",
            CandleColor::Green => "green",
            CandleColor::Red => "red",
            CandleColor::Pink => "pink",
        }
    }
}

/// 代码表条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// 股票代码（市场内唯一）
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 市值，仅用于排序
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    /// 显示标签 "名称 (代码)"
    pub label: String,
}

impl SymbolEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>, market_cap: Option<f64>) -> Self {
        let code = code.into();
        let name = name.into();
        let label = format!("{} ({})", name, code);
        Self {
            code,
            name,
            market_cap,
            label,
        }
    }
}

/// 从标签中取出代码，即最后一对括号内的文本
pub fn code_from_label(label: &str) -> String {
    let tail = label.rsplit('(').next().unwrap_or(label);
    tail.split(')').next().unwrap_or(tail).trim().to_string()
}

/// 从标签中取出名称，即第一个 "(" 之前的文本
pub fn name_from_label(label: &str) -> String {
    label.split('(').next().unwrap_or(label).trim().to_string()
}

/// 自选列表（名称, 代码）
pub const WATCHLIST: [(&str, &str); 4] = [
    ("Samsung Electronics", "005930"),
    ("SK hynix", "000660"),
    ("NAVER", "035420"),
    ("Hyundai Motor", "005380"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        println!("\n========== 测试标签拆分 ==========");
        let entry = SymbolEntry::new("005930", "Samsung Electronics", Some(1.0));
        assert_eq!(entry.label, "Samsung Electronics (005930)");
        assert_eq!(code_from_label(&entry.label), "005930");
        assert_eq!(name_from_label(&entry.label), "Samsung Electronics");
        println!("✅ 标签拆分测试通过！");
    }

    #[test]
    fn test_label_with_parentheses_in_name() {
        let label = "Hanwha (Pref) (000885)";
        assert_eq!(code_from_label(label), "000885");
        assert_eq!(name_from_label(label), "Hanwha");
    }

    #[test]
    fn test_market_parse() {
        assert_eq!("kosdaq".parse::<Market>().unwrap(), Market::Kosdaq);
        assert_eq!(" KOSPI ".parse::<Market>().unwrap(), Market::Kospi);
        assert!("NYSE".parse::<Market>().is_err());
        assert_eq!(Market::Kosdaq.krx_id(), "KSQ");
    }

    #[test]
    fn test_candle_color_hex() {
        assert_eq!(CandleColor::Pink.hex(), "#e91e63");
        assert!(CandleColor::UP_CHOICES.contains(&CandleColor::Green));
        assert!(!CandleColor::DOWN_CHOICES.contains(&CandleColor::Green));
    }
}
