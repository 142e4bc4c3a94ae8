//! 错误类型
//!
//! 任何错误都只影响对应的组件（表单、指标卡片、图表），不会终止服务

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MAX_DAYS, MIN_DAYS};

/// 参数校验错误，只阻止本次应用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("均线周期必须是 2 以上的整数")]
    NotAnInteger,
    #[error("均线周期最小为 2")]
    PeriodTooSmall,
    #[error("查询天数必须在 {} 到 {} 之间", MIN_DAYS, MAX_DAYS)]
    LookbackOutOfRange,
}

impl ValidationError {
    /// 用于 URL 参数的错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NotAnInteger => "not_an_integer",
            ValidationError::PeriodTooSmall => "period_too_small",
            ValidationError::LookbackOutOfRange => "lookback_out_of_range",
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("数据不可用: {0}")]
    DataUnavailable(String),
    #[error("图表渲染失败: {0}")]
    Render(String),
}

impl DashboardError {
    /// 将数据源错误转换为数据不可用
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        DashboardError::DataUnavailable(err.to_string())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
