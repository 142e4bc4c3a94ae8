//! 仪表盘 JSON 接口
//!
//! GET /dashboard - 以当前会话执行一轮渲染并返回全部组件数据

use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::handlers::{session_cookie, session_id};
use crate::models::{seoul_today, ApiResponse};
use crate::services::dashboard::Dashboard;
use crate::services::session::SessionStore;

pub async fn get_dashboard(
    req: HttpRequest,
    dashboard: web::Data<Dashboard>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse> {
    let (id, _) = session_id(&req);
    let view = dashboard.render(sessions.load(&id).await, seoul_today()).await;
    sessions.save(id, view.state.clone()).await;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(id))
        .json(ApiResponse::success(view)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(get_dashboard));
}
