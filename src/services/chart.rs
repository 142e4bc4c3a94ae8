//! K线图渲染
//!
//! 根据生效参数生成 ECharts 配置（JSON），由页面上的 echarts 负责绘制

use charming::component::{Axis, DataZoom, DataZoomType, Grid, Legend, Title};
use charming::datatype::CompositeValue;
use charming::element::{
    AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, LineStyle, SplitLine, TextStyle,
    Tooltip, Trigger,
};
use charming::series::{Bar, Candlestick, Line};
use charming::Chart;
use serde_json::{json, Value};

use crate::error::{DashboardError, DashboardResult};
use crate::models::{OhlcvRow, Parameters};

const CANDLE_SERIES: &str = "OHLC";
const VOLUME_SERIES: &str = "Volume";
const MA_PALETTE: [&str; 6] = ["#f6c85f", "#6fd3ff", "#b388ff", "#ffab40", "#69f0ae", "#ff80ab"];

/// 图表样式
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub up: &'static str,
    pub down: &'static str,
    pub background: &'static str,
    pub text: &'static str,
    pub grid: &'static str,
}

impl ChartStyle {
    /// 暗色主题，涨跌颜色取自参数
    pub fn from_params(params: &Parameters) -> Self {
        Self {
            up: params.up_color.hex(),
            down: params.down_color.hex(),
            background: "#131722",
            text: "#b2b5be",
            grid: "#2a2e39",
        }
    }
}

/// 一次渲染请求
pub struct ChartRequest<'a> {
    pub title: String,
    pub rows: &'a [OhlcvRow],
    pub style: ChartStyle,
    /// 均线周期
    pub overlays: &'a [u32],
    pub show_volume: bool,
}

/// 图表渲染器
pub trait ChartRenderer: Send + Sync + 'static {
    /// 返回可在页面中直接使用的图表配置
    fn render(&self, request: &ChartRequest<'_>) -> DashboardResult<String>;
}

/// 基于 charming 的 ECharts 渲染器
pub struct CharmingRenderer;

impl ChartRenderer for CharmingRenderer {
    fn render(&self, request: &ChartRequest<'_>) -> DashboardResult<String> {
        if request.rows.is_empty() {
            return Err(DashboardError::Render("没有可绘制的数据".to_string()));
        }
        let chart = build_chart(request);
        let mut option =
            serde_json::to_value(&chart).map_err(|e| DashboardError::Render(e.to_string()))?;
        apply_candle_colors(&mut option, &request.style)?;
        Ok(option.to_string())
    }
}

/// K线涨跌颜色，charming 的 Candlestick 不提供 itemStyle，直接写入序列化结果
fn apply_candle_colors(option: &mut Value, style: &ChartStyle) -> DashboardResult<()> {
    let candle = option
        .get_mut("series")
        .and_then(|series| series.get_mut(0))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| DashboardError::Render("缺少K线序列".to_string()))?;

    candle.insert(
        "itemStyle".to_string(),
        json!({
            "color": style.up,
            "color0": style.down,
            "borderColor": style.up,
            "borderColor0": style.down,
        }),
    );
    Ok(())
}

fn build_chart(request: &ChartRequest<'_>) -> Chart {
    let style = &request.style;
    let dates: Vec<String> = request
        .rows
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();
    let candles: Vec<Vec<f64>> = request
        .rows
        .iter()
        .map(|r| vec![r.open, r.close, r.low, r.high])
        .collect();
    let closes: Vec<f64> = request.rows.iter().map(|r| r.close).collect();

    let mut legend = vec![CANDLE_SERIES.to_string()];
    legend.extend(request.overlays.iter().map(|n| format!("MA{}", n)));

    let price_grid = if request.show_volume {
        Grid::new().left("8%").right("4%").top("10%").height("58%")
    } else {
        Grid::new().left("8%").right("4%").top("10%").bottom("10%")
    };

    let mut chart = Chart::new()
        .background_color(style.background)
        .title(
            Title::new()
                .text(request.title.as_str())
                .text_style(TextStyle::new().color(style.text)),
        )
        .legend(
            Legend::new()
                .inactive_color("#777")
                .text_style(TextStyle::new().color(style.text))
                .data(legend),
        )
        .tooltip(
            Tooltip::new().trigger(Trigger::Axis).axis_pointer(
                AxisPointer::new()
                    .animation(true)
                    .type_(AxisPointerType::Cross),
            ),
        )
        .grid(price_grid)
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(dates.clone())
                .axis_label(AxisLabel::new().color(style.text)),
        )
        .y_axis(
            Axis::new()
                .scale(true)
                .axis_label(AxisLabel::new().color(style.text))
                .split_line(SplitLine::new().line_style(LineStyle::new().color(style.grid))),
        )
        .data_zoom(DataZoom::new().type_(DataZoomType::Inside))
        .series(Candlestick::new().name(CANDLE_SERIES).data(candles));

    for (i, period) in request.overlays.iter().enumerate() {
        let values: Vec<CompositeValue> = moving_average(&closes, *period as usize)
            .into_iter()
            .map(|v| match v {
                Some(v) => CompositeValue::from(v),
                None => CompositeValue::from("-"),
            })
            .collect();
        chart = chart.series(
            Line::new()
                .name(format!("MA{}", period))
                .data(values)
                .show_symbol(false)
                .line_style(LineStyle::new().color(MA_PALETTE[i % MA_PALETTE.len()])),
        );
    }

    if request.show_volume {
        let volumes: Vec<f64> = request
            .rows
            .iter()
            .map(|r| r.volume.unwrap_or(0.0))
            .collect();
        chart = chart
            .grid(Grid::new().left("8%").right("4%").top("74%").height("16%"))
            .x_axis(
                Axis::new()
                    .type_(AxisType::Category)
                    .grid_index(1)
                    .data(dates)
                    .axis_label(AxisLabel::new().show(false)),
            )
            .y_axis(
                Axis::new()
                    .grid_index(1)
                    .scale(true)
                    .axis_label(AxisLabel::new().color(style.text))
                    .split_line(SplitLine::new().show(false)),
            )
            .series(
                Bar::new()
                    .name(VOLUME_SERIES)
                    .x_axis_index(1)
                    .y_axis_index(1)
                    .item_style(ItemStyle::new().color(style.grid))
                    .data(volumes),
            );
    }

    chart
}

/// 收盘价的简单移动平均，前 `period - 1` 个点为空
pub fn moving_average(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut out = Vec::with_capacity(closes.len());
    let mut sum = 0.0;
    for (i, close) in closes.iter().enumerate() {
        sum += close;
        if i >= period {
            sum -= closes[i - period];
        }
        if i + 1 >= period {
            out.push(Some(sum / period as f64));
        } else {
            out.push(None);
        }
    }
    out
}
