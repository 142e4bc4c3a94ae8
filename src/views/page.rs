use std::fmt::Write;

use crate::error::ValidationError;
use crate::models::{CandleColor, Draft, Market, PriceSnapshot, MAX_DAYS, MIN_DAYS};
use crate::services::dashboard::{ChartPanel, DashboardView, KpiPanel, WatchCard};
use crate::services::session::Notice;
use crate::views::{escape, script_safe, signed, thousands};

const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";
const PLACEHOLDER: &str = "—";

const STYLE: &str = r#"
body { background: #0e1117; color: #d1d4dc; font-family: sans-serif; margin: 0; }
main { display: grid; grid-template-columns: 280px 1fr; gap: 16px; padding: 16px; }
aside form label { display: block; margin-top: 10px; font-size: 13px; }
aside form input, aside form select { width: 100%; box-sizing: border-box; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; }
.card { background: #131722; border-radius: 6px; padding: 12px; }
.card .value { font-size: 20px; font-weight: bold; }
.up { color: #ef5350; } .down { color: #42a5f5; } .muted { color: #787b86; }
.notice { padding: 8px 12px; border-radius: 4px; margin-bottom: 12px; }
.notice.ok { background: #1b5e20; } .notice.err { background: #b71c1c; }
#chart { width: 100%; height: 640px; }
table { border-collapse: collapse; font-size: 12px; width: 100%; }
td, th { border-bottom: 1px solid #2a2e39; padding: 2px 8px; text-align: right; }
"#;

/// 渲染完整页面
pub fn render_page(view: &DashboardView, notice: Option<&Notice>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Stock Dashboard</title>\n");
    let _ = writeln!(html, "<script src=\"{}\"></script>", ECHARTS_CDN);
    let _ = writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE);
    html.push_str("<main>\n<aside>\n<h2>Stock Dashboard</h2>\n");
    let rejected = match notice {
        Some(Notice::Rejected(err)) => Some(*err),
        _ => None,
    };
    html.push_str(&render_form(&view.state.draft, &view.draft_labels, rejected));
    html.push_str("</aside>\n<section>\n");

    if let Some(Notice::Applied) = notice {
        html.push_str("<div class=\"notice ok\">参数已应用</div>\n");
    }
    html.push_str(&render_watchlist(&view.watchlist));
    html.push_str(&render_kpi(view.kpi.as_ref()));
    html.push_str(&render_chart(&view.chart));

    html.push_str("</section>\n</main>\n</body>\n</html>\n");
    html
}

fn select_options<T, F>(items: &[T], selected: &T, value: F) -> String
where
    T: PartialEq,
    F: Fn(&T) -> String,
{
    items
        .iter()
        .map(|item| {
            let v = escape(&value(item));
            let attr = if item == selected { " selected" } else { "" };
            format!("<option value=\"{}\"{}>{}</option>", v, attr, v)
        })
        .collect()
}

fn render_form(draft: &Draft, labels: &[String], rejected: Option<ValidationError>) -> String {
    let mut html = String::from("<form method=\"post\" action=\"/dashboard\" id=\"params\">\n");

    // 切换市场时立即提交草稿，以便刷新股票列表
    let _ = writeln!(
        html,
        "<label>Market<select name=\"market\" onchange=\"this.form.submit()\">{}</select></label>",
        select_options(&Market::ALL, &draft.market, |m| m.as_str().to_string())
    );

    if labels.is_empty() {
        html.push_str("<label>Symbol<select name=\"symbol\" disabled><option>暂无数据</option></select></label>\n");
    } else {
        let selected = draft.selected_label.clone().unwrap_or_default();
        let _ = writeln!(
            html,
            "<label>Symbol<select name=\"symbol\">{}</select></label>",
            select_options(labels, &selected, |l| l.clone())
        );
    }

    let _ = writeln!(
        html,
        "<label>Lookback (days)<input type=\"number\" name=\"days\" min=\"{}\" max=\"{}\" step=\"30\" value=\"{}\"></label>",
        MIN_DAYS, MAX_DAYS, draft.days
    );
    let _ = writeln!(
        html,
        "<label>Up color<select name=\"up_color\">{}</select></label>",
        select_options(&CandleColor::UP_CHOICES, &draft.up_color, color_name)
    );
    let _ = writeln!(
        html,
        "<label>Down color<select name=\"down_color\">{}</select></label>",
        select_options(&CandleColor::DOWN_CHOICES, &draft.down_color, color_name)
    );
    let _ = writeln!(
        html,
        "<label><input type=\"checkbox\" name=\"show_volume\" value=\"on\"{}> Show volume</label>",
        if draft.show_volume { " checked" } else { "" }
    );
    let _ = writeln!(
        html,
        "<label>Moving averages<input type=\"text\" name=\"mav_text\" placeholder=\"e.g. 7, 14, 30, 200\" value=\"{}\"></label>",
        escape(&draft.mav_text)
    );
    // 校验错误显示在输入框旁
    if let Some(err) = rejected {
        let _ = writeln!(
            html,
            "<div class=\"notice err\" id=\"mav-error\">{}</div>",
            escape(&err.to_string())
        );
    }

    html.push_str("<button type=\"submit\" name=\"action\" value=\"edit\">Save draft</button>\n");
    html.push_str("<button type=\"submit\" name=\"action\" value=\"apply\">Apply</button>\n");
    html.push_str("</form>\n");
    html
}

fn color_name(color: &CandleColor) -> String {
    color.as_str().to_string()
}

fn change_class(change: f64) -> &'static str {
    if change > 0.0 {
        "up"
    } else if change < 0.0 {
        "down"
    } else {
        "muted"
    }
}

fn render_watchlist(cards: &[WatchCard]) -> String {
    let mut html = String::from("<div class=\"cards\">\n");
    for card in cards {
        let _ = write!(
            html,
            "<div class=\"card\"><div class=\"muted\">{} ({})</div>",
            escape(&card.name),
            escape(&card.code)
        );
        match &card.snapshot {
            Some(s) => {
                let _ = write!(
                    html,
                    "<div class=\"value\">{}</div><div class=\"{}\">{} ({}%)</div>",
                    thousands(s.close, 0),
                    change_class(s.change),
                    signed(s.change, 0),
                    signed(s.change_rate, 2)
                );
                let _ = write!(
                    html,
                    "<div class=\"muted\">较前一交易日 · 基准日 {}</div>",
                    s.as_of
                );
            }
            None => {
                let _ = write!(
                    html,
                    "<div class=\"value\">{}</div><div class=\"muted\">暂无数据</div>",
                    PLACEHOLDER
                );
            }
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
    html
}

fn kpi_cell(title: &str, value: String, class: &str) -> String {
    format!(
        "<div class=\"card\"><div class=\"muted\">{}</div><div class=\"value {}\">{}</div></div>",
        title, class, value
    )
}

fn render_kpi(kpi: Option<&KpiPanel>) -> String {
    let Some(kpi) = kpi else {
        return String::new();
    };

    let mut html = format!(
        "<h3>{} ({})</h3>\n<div class=\"cards\">\n",
        escape(&kpi.name),
        escape(&kpi.code)
    );
    match &kpi.snapshot {
        Some(s) => html.push_str(&kpi_cells(s)),
        None => {
            for title in ["Close", "Change", "High / Low", "Volume"] {
                html.push_str(&kpi_cell(title, PLACEHOLDER.to_string(), "muted"));
            }
        }
    }
    html.push_str("</div>\n");
    if let Some(s) = &kpi.snapshot {
        let _ = writeln!(html, "<p class=\"muted\">基准日 {}</p>", s.as_of);
    }
    html
}

fn kpi_cells(s: &PriceSnapshot) -> String {
    let class = change_class(s.change);
    [
        kpi_cell("Close", thousands(s.close, 0), ""),
        kpi_cell(
            "Change",
            format!("{} ({}%)", signed(s.change, 0), signed(s.change_rate, 2)),
            class,
        ),
        kpi_cell(
            "High / Low",
            format!("{} / {}", thousands(s.high, 0), thousands(s.low, 0)),
            "",
        ),
        kpi_cell(
            "Volume",
            s.volume
                .map(|v| thousands(v, 0))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            "",
        ),
    ]
    .concat()
}

fn render_chart(chart: &ChartPanel) -> String {
    match chart {
        ChartPanel::Ready { title, option, rows } => {
            let mut html = format!("<h3>{}</h3>\n<div id=\"chart\"></div>\n", escape(title));
            let _ = writeln!(
                html,
                "<script>echarts.init(document.getElementById('chart'), null, {{renderer: 'canvas'}}).setOption({});</script>",
                script_safe(option)
            );

            html.push_str("<details><summary>Raw data</summary>\n<table>\n");
            html.push_str("<tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th><th>Volume</th></tr>\n");
            for row in rows.iter().rev() {
                let _ = writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    row.date,
                    thousands(row.open, 0),
                    thousands(row.high, 0),
                    thousands(row.low, 0),
                    thousands(row.close, 0),
                    row.volume
                        .map(|v| thousands(v, 0))
                        .unwrap_or_else(|| PLACEHOLDER.to_string())
                );
            }
            html.push_str("</table>\n</details>\n");
            html
        }
        ChartPanel::InsufficientData { title } => format!(
            "<h3>{}</h3>\n<p class=\"muted\">数据不足，无法绘制K线图</p>\n",
            escape(title)
        ),
        ChartPanel::Failed { title, message } => format!(
            "<h3>{}</h3>\n<p class=\"notice err\">{}</p>\n",
            escape(title),
            escape(message)
        ),
        ChartPanel::NoSymbol => "<p class=\"muted\">暂无可选股票</p>\n".to_string(),
    }
}
