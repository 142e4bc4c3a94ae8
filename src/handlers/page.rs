//! 页面处理器
//!
//! - GET / - 渲染仪表盘页面
//! - POST /dashboard - 提交参数表单，`action=apply` 时应用参数，随后重定向回页面

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::Deserialize;

use crate::error::ValidationError;
use crate::handlers::{session_cookie, session_id};
use crate::models::{seoul_today, CandleColor, Market};
use crate::services::dashboard::Dashboard;
use crate::services::session::{reduce, DashboardState, Intent, Notice, SessionStore};
use crate::views;

/// 重定向时携带的提示
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub applied: Option<bool>,
    pub error: Option<ValidationError>,
}

impl PageQuery {
    fn notice(&self) -> Option<Notice> {
        match (self.error, self.applied) {
            (Some(err), _) => Some(Notice::Rejected(err)),
            (None, Some(true)) => Some(Notice::Applied),
            _ => None,
        }
    }
}

/// 参数表单
#[derive(Debug, Deserialize)]
pub struct DraftForm {
    pub market: Market,
    pub symbol: Option<String>,
    pub days: String,
    pub up_color: CandleColor,
    pub down_color: CandleColor,
    /// 复选框未勾选时不提交
    pub show_volume: Option<String>,
    #[serde(default)]
    pub mav_text: String,
    pub action: Option<String>,
}

impl DraftForm {
    /// 转换为草稿编辑操作
    pub fn intents(self) -> Vec<Intent> {
        let mut intents = vec![Intent::SetMarket(self.market)];
        if let Some(symbol) = self.symbol.filter(|s| !s.is_empty()) {
            intents.push(Intent::SetSymbol(symbol));
        }
        // 无法解析的天数按越界处理
        intents.push(Intent::SetDays(self.days.trim().parse().unwrap_or(0)));
        intents.push(Intent::SetUpColor(self.up_color));
        intents.push(Intent::SetDownColor(self.down_color));
        intents.push(Intent::SetShowVolume(self.show_volume.is_some()));
        intents.push(Intent::SetMavText(self.mav_text));
        intents
    }

    fn is_apply(&self) -> bool {
        self.action.as_deref() == Some("apply")
    }
}

pub async fn index(
    req: HttpRequest,
    dashboard: web::Data<Dashboard>,
    sessions: web::Data<SessionStore>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (id, is_new) = session_id(&req);
    if is_new {
        log::info!("新会话 {}，当前会话数 {}", id, sessions.len().await + 1);
    }

    let view = dashboard.render(sessions.load(&id).await, seoul_today()).await;
    sessions.save(id, view.state.clone()).await;

    let html = views::render_page(&view, query.notice().as_ref());
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(id))
        .content_type("text/html; charset=utf-8")
        .body(html))
}

pub async fn submit(
    req: HttpRequest,
    dashboard: web::Data<Dashboard>,
    sessions: web::Data<SessionStore>,
    form: web::Form<DraftForm>,
) -> Result<HttpResponse> {
    let (id, _) = session_id(&req);
    let form = form.into_inner();
    let apply = form.is_apply();

    let (mut state, _) = dashboard.resolve(sessions.load(&id).await).await;
    let mut notice = None;
    for intent in form.intents() {
        let update = reduce(state, intent);
        state = update.state;
        notice = update.notice.or(notice);
    }

    let (state, _) = dashboard.resolve(state).await;
    let state: DashboardState = if apply && notice.is_none() {
        let update = reduce(state, Intent::Apply);
        notice = update.notice;
        update.state
    } else {
        state
    };
    sessions.save(id, state).await;

    let location = match notice {
        Some(Notice::Applied) => "/?applied=true".to_string(),
        Some(Notice::Rejected(err)) => format!("/?error={}", err.code()),
        None => "/".to_string(),
    };

    Ok(HttpResponse::SeeOther()
        .cookie(session_cookie(id))
        .insert_header((header::LOCATION, location))
        .finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/dashboard", web::post().to(submit));
}
