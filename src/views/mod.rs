//! 页面渲染
//!
//! 将一轮渲染结果拼装为完整的 HTML 页面

mod page;

pub use page::render_page;

/// HTML 转义
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 千分位格式化，保留指定小数位
pub fn thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// 带符号的数值
pub fn signed(value: f64, decimals: usize) -> String {
    if value > 0.0 {
        format!("+{}", thousands(value, decimals))
    } else {
        thousands(value, decimals)
    }
}

/// 嵌入 `<script>` 的 JSON 需要避免提前闭合标签
pub fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
