//! 行情接口处理器
//!
//! ## API 列表
//! - GET /markets/{market}/symbols - 获取市场股票列表
//! - GET /stocks/{code}/ohlcv - 获取日K线（start/end 或 days）
//! - GET /stocks/{code}/snapshot - 获取当日指标
//! - GET /watchlist - 获取自选列表

use actix_web::{web, HttpResponse, Result};
use chrono::Duration;

use crate::error::{DashboardError, ValidationError};
use crate::handlers::error_response;
use crate::models::{
    seoul_today, ApiResponse, Market, OhlcvQuery, OhlcvRow, PriceSnapshot, SymbolEntry,
    DEFAULT_DAYS, MAX_DAYS, MIN_DAYS,
};
use crate::services::dashboard::Dashboard;

/// 获取市场股票列表
///
/// GET /api/v1/markets/{market}/symbols
pub async fn list_symbols(
    dashboard: web::Data<Dashboard>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let market = match path.into_inner().parse::<Market>() {
        Ok(market) => market,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<Vec<SymbolEntry>>::error(e)));
        }
    };

    match dashboard.data().symbols(market).await {
        Ok(symbols) => Ok(HttpResponse::Ok().json(ApiResponse::success(symbols))),
        Err(e) => Ok(error_response::<Vec<SymbolEntry>>(&e)),
    }
}

/// 获取日K线
///
/// GET /api/v1/stocks/{code}/ohlcv?start=2024-01-01&end=2024-03-31
/// GET /api/v1/stocks/{code}/ohlcv?days=30
pub async fn get_ohlcv(
    dashboard: web::Data<Dashboard>,
    path: web::Path<String>,
    query: web::Query<OhlcvQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let end = query.end.unwrap_or_else(seoul_today);
    let start = match query.start {
        Some(start) => start,
        None => {
            let days = query.days.unwrap_or(DEFAULT_DAYS);
            if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
                let e = DashboardError::from(ValidationError::LookbackOutOfRange);
                return Ok(error_response::<Vec<OhlcvRow>>(&e));
            }
            match end.checked_sub_signed(Duration::days(i64::from(days))) {
                Some(start) => start,
                None => {
                    return Ok(HttpResponse::BadRequest().json(
                        ApiResponse::<Vec<OhlcvRow>>::error(format!("结束日期 {} 超出范围", end)),
                    ));
                }
            }
        }
    };

    if start > end {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<Vec<OhlcvRow>>::error(
            "开始日期不能晚于结束日期".to_string(),
        )));
    }

    match dashboard.data().ohlcv(&code, start, end).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        Err(e) => Ok(error_response::<Vec<OhlcvRow>>(&e)),
    }
}

/// 获取当日指标
///
/// GET /api/v1/stocks/{code}/snapshot
pub async fn get_snapshot(
    dashboard: web::Data<Dashboard>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match dashboard.data().snapshot(&code, seoul_today()).await {
        Some(snapshot) => Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot))),
        None => Ok(HttpResponse::NotFound().json(ApiResponse::<PriceSnapshot>::error(format!(
            "{} 暂无数据",
            code
        )))),
    }
}

/// 获取自选列表
///
/// GET /api/v1/watchlist
pub async fn get_watchlist(dashboard: web::Data<Dashboard>) -> Result<HttpResponse> {
    let cards = dashboard.watchlist(seoul_today()).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(cards)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/markets/{market}/symbols", web::get().to(list_symbols))
        .route("/watchlist", web::get().to(get_watchlist))
        .service(
            web::scope("/stocks")
                .route("/{code}/ohlcv", web::get().to(get_ohlcv))
                .route("/{code}/snapshot", web::get().to(get_snapshot)),
        );
}
