//! 均线周期解析
//!
//! 支持 "7"、"7,14,30"、"7 14 30" 以及混合分隔

use crate::error::ValidationError;

/// 均线最小周期
pub const MIN_PERIOD: u32 = 2;

/// 解析用户输入的均线周期
///
/// 逗号和空白都视为分隔符，空输入返回空列表（不显示均线）。
/// 结果去重并升序排列，遇到第一个非法项即返回错误。
pub fn parse_mav(raw: &str) -> Result<Vec<u32>, ValidationError> {
    let mut periods = Vec::new();

    for token in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let n: i64 = token.parse().map_err(|_| ValidationError::NotAnInteger)?;
        if n < MIN_PERIOD as i64 {
            return Err(ValidationError::PeriodTooSmall);
        }
        let n = u32::try_from(n).map_err(|_| ValidationError::NotAnInteger)?;
        periods.push(n);
    }

    periods.sort_unstable();
    periods.dedup();
    Ok(periods)
}
