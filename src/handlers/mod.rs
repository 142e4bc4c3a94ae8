pub mod dashboard;
pub mod health;
pub mod page;
pub mod session;
pub mod stock;

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::error::DashboardError;
use crate::models::ApiResponse;

/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "dashboard_session";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(page::config);
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(stock::config)
            .configure(session::config)
            .configure(dashboard::config)
    );
}

/// 取出请求中的会话 ID，没有或无法解析时生成新的
pub(crate) fn session_id(req: &HttpRequest) -> (Uuid, bool) {
    match req
        .cookie(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    }
}

pub(crate) fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

/// 将错误转换为统一响应
pub(crate) fn error_response<T>(e: &DashboardError) -> HttpResponse
where
    T: serde::Serialize,
{
    let response = ApiResponse::<T>::error(e.to_string());
    match e {
        DashboardError::Validation(_) => HttpResponse::BadRequest().json(response),
        DashboardError::DataUnavailable(_) => HttpResponse::BadGateway().json(response),
        DashboardError::Render(_) => HttpResponse::InternalServerError().json(response),
    }
}
