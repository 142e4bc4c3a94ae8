use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::{seoul_today, ApiResponse};
use crate::services::session::SessionStore;

/// 服务状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub service: &'static str,
    pub version: &'static str,
    /// 首尔时区的当前交易日期
    pub market_date: String,
    /// 未注册会话存储时为空
    pub sessions: Option<usize>,
}

pub async fn health_check(sessions: Option<web::Data<SessionStore>>) -> Result<HttpResponse> {
    let sessions = match sessions {
        Some(store) => Some(store.len().await),
        None => None,
    };
    let status = HealthStatus {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        market_date: seoul_today().to_string(),
        sessions,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(config)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["service"], "stock-dashboard");
        assert!(body["data"]["sessions"].is_null());
    }

    #[actix_web::test]
    async fn test_health_reports_sessions() {
        let sessions = testing::sessions();
        sessions.save(uuid::Uuid::new_v4(), Default::default()).await;
        let app = test::init_service(App::new().app_data(sessions).configure(config)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["sessions"], 1);
    }
}
