//! 仪表盘渲染流程
//!
//! 一次请求执行一轮完整渲染：校正选中股票、自选列表、当日指标、K线图。
//! 每个组件独立降级，一个组件失败不影响其他组件。

use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use serde::Serialize;

use crate::models::{
    code_from_label, name_from_label, OhlcvRow, Parameters, PriceSnapshot, WATCHLIST,
};
use crate::services::chart::{ChartRenderer, ChartRequest, ChartStyle};
use crate::services::market_data::MarketData;
use crate::services::session::{reduce, DashboardState, Intent};

/// 原始数据表展示的最大行数
pub const RAW_TABLE_ROWS: usize = 200;

/// 自选卡片
#[derive(Debug, Clone, Serialize)]
pub struct WatchCard {
    pub name: String,
    pub code: String,
    /// `None` 表示暂无数据
    pub snapshot: Option<PriceSnapshot>,
}

/// 当日指标面板
#[derive(Debug, Clone, Serialize)]
pub struct KpiPanel {
    pub name: String,
    pub code: String,
    pub snapshot: Option<PriceSnapshot>,
}

/// K线图面板
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartPanel {
    Ready {
        title: String,
        option: String,
        /// 最近的原始数据
        rows: Vec<OhlcvRow>,
    },
    InsufficientData { title: String },
    Failed { title: String, message: String },
    NoSymbol,
}

/// 一轮渲染的结果
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub state: DashboardState,
    /// 草稿市场的股票标签
    pub draft_labels: Vec<String>,
    pub watchlist: Vec<WatchCard>,
    pub kpi: Option<KpiPanel>,
    pub chart: ChartPanel,
}

pub struct Dashboard {
    data: MarketData,
    renderer: Box<dyn ChartRenderer>,
}

impl Dashboard {
    pub fn new(data: MarketData, renderer: Box<dyn ChartRenderer>) -> Self {
        Self { data, renderer }
    }

    pub fn data(&self) -> &MarketData {
        &self.data
    }

    /// 初始化生效参数并按草稿市场校正草稿中的选中股票
    pub async fn resolve(&self, mut state: DashboardState) -> (DashboardState, Vec<String>) {
        if state.params.selected_label.is_none() {
            let labels = self.data.labels(state.params.market).await;
            state.ensure_selected(&labels);
            if state.draft.selected_label.is_none() && state.draft.market == state.params.market {
                state.draft.selected_label = state.params.selected_label.clone();
            }
        }

        let labels = self.data.labels(state.draft.market).await;
        let state = reduce(
            state,
            Intent::ResolveSymbol {
                labels: labels.clone(),
            },
        )
        .state;
        (state, labels)
    }

    /// 自选列表，与草稿/生效参数无关
    pub async fn watchlist(&self, today: NaiveDate) -> Vec<WatchCard> {
        let cards = WATCHLIST.iter().map(|(name, code)| async move {
            WatchCard {
                name: name.to_string(),
                code: code.to_string(),
                snapshot: self.data.snapshot(code, today).await,
            }
        });
        join_all(cards).await
    }

    /// 当日指标
    pub async fn kpi(&self, params: &Parameters, today: NaiveDate) -> Option<KpiPanel> {
        let label = params.selected_label.as_deref()?;
        let code = code_from_label(label);
        let snapshot = self.data.snapshot(&code, today).await;
        Some(KpiPanel {
            name: name_from_label(label),
            code,
            snapshot,
        })
    }

    /// 请求生效参数对应区间的日K线并渲染
    pub async fn chart(&self, params: &Parameters, today: NaiveDate) -> ChartPanel {
        let Some(label) = params.selected_label.as_deref() else {
            return ChartPanel::NoSymbol;
        };
        let code = code_from_label(label);
        let title = format!(
            "{} ({}) · last {} days",
            name_from_label(label),
            code,
            params.days
        );

        let start = today - Duration::days(i64::from(params.days));
        let rows = match self.data.ohlcv(&code, start, today).await {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("获取 {} 日K线失败: {}", code, e);
                return ChartPanel::Failed {
                    title,
                    message: e.to_string(),
                };
            }
        };

        if rows.len() < 2 {
            return ChartPanel::InsufficientData { title };
        }

        let request = ChartRequest {
            title: title.clone(),
            rows: &rows,
            style: ChartStyle::from_params(params),
            overlays: &params.mav,
            show_volume: params.show_volume,
        };

        match self.renderer.render(&request) {
            Ok(option) => {
                let skip = rows.len().saturating_sub(RAW_TABLE_ROWS);
                ChartPanel::Ready {
                    title,
                    option,
                    rows: rows.into_iter().skip(skip).collect(),
                }
            }
            Err(e) => {
                log::error!("渲染 {} 图表失败: {}", code, e);
                ChartPanel::Failed {
                    title,
                    message: e.to_string(),
                }
            }
        }
    }

    /// 执行一轮完整渲染
    pub async fn render(&self, state: DashboardState, today: NaiveDate) -> DashboardView {
        let (state, draft_labels) = self.resolve(state).await;
        let watchlist = self.watchlist(today).await;
        let kpi = self.kpi(&state.params, today).await;
        let chart = self.chart(&state.params, today).await;

        DashboardView {
            state,
            draft_labels,
            watchlist,
            kpi,
            chart,
        }
    }
}
