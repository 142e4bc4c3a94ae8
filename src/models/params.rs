//! 图表参数模型
//!
//! `Parameters` 是当前生效的配置，`Draft` 是尚未应用的编辑副本

use serde::{Deserialize, Serialize};

use super::market::{CandleColor, Market};

/// 默认回看天数
pub const DEFAULT_DAYS: u32 = 365;
/// 回看天数下限
pub const MIN_DAYS: u32 = 5;
/// 回看天数上限
pub const MAX_DAYS: u32 = 3650;

/// 生效参数，驱动数据请求与图表渲染
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub market: Market,
    pub selected_label: Option<String>,
    pub days: u32,
    pub up_color: CandleColor,
    pub down_color: CandleColor,
    pub show_volume: bool,
    /// 均线周期：去重、升序、每项 >= 2
    pub mav: Vec<u32>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            market: Market::Kospi,
            selected_label: None,
            days: DEFAULT_DAYS,
            up_color: CandleColor::Blue,
            down_color: CandleColor::Pink,
            show_volume: true,
            mav: Vec::new(),
        }
    }
}

/// 草稿参数，额外保存均线输入框的原始文本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub market: Market,
    pub selected_label: Option<String>,
    pub days: u32,
    pub up_color: CandleColor,
    pub down_color: CandleColor,
    pub show_volume: bool,
    pub mav: Vec<u32>,
    pub mav_text: String,
}

impl Draft {
    /// 以生效参数为底创建草稿
    pub fn from_params(params: &Parameters, mav_text: impl Into<String>) -> Self {
        Self {
            market: params.market,
            selected_label: params.selected_label.clone(),
            days: params.days,
            up_color: params.up_color,
            down_color: params.down_color,
            show_volume: params.show_volume,
            mav: params.mav.clone(),
            mav_text: mav_text.into(),
        }
    }

    /// 复制为生效参数（全量覆盖）
    pub fn to_params(&self) -> Parameters {
        Parameters {
            market: self.market,
            selected_label: self.selected_label.clone(),
            days: self.days,
            up_color: self.up_color,
            down_color: self.down_color,
            show_volume: self.show_volume,
            mav: self.mav.clone(),
        }
    }
}

impl Default for Draft {
    fn default() -> Self {
        Self::from_params(&Parameters::default(), "")
    }
}
