//! 会话状态接口
//!
//! - GET /session - 获取当前会话的草稿与生效参数
//! - POST /session/intents - 提交一个用户操作，返回新的状态和提示

use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::handlers::{session_cookie, session_id};
use crate::models::ApiResponse;
use crate::services::dashboard::Dashboard;
use crate::services::session::{reduce, Intent, SessionStore};

pub async fn get_session(req: HttpRequest, sessions: web::Data<SessionStore>) -> Result<HttpResponse> {
    let (id, _) = session_id(&req);
    let state = sessions.load(&id).await;
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(id))
        .json(ApiResponse::success(state)))
}

/// 执行一次状态转换
///
/// 转换后按草稿市场重新校正选中股票
pub async fn post_intent(
    req: HttpRequest,
    dashboard: web::Data<Dashboard>,
    sessions: web::Data<SessionStore>,
    intent: web::Json<Intent>,
) -> Result<HttpResponse> {
    let (id, _) = session_id(&req);
    let intent = intent.into_inner();
    log::debug!("会话 {} 操作: {:?}", id, intent);

    let (state, _) = dashboard.resolve(sessions.load(&id).await).await;
    let mut update = reduce(state, intent);
    let (state, _) = dashboard.resolve(update.state).await;
    update.state = state;

    sessions.save(id, update.state.clone()).await;
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(id))
        .json(ApiResponse::success(update)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/session")
            .route("", web::get().to(get_session))
            .route("/intents", web::post().to(post_intent)),
    );
}
