//! 股票行情仪表盘服务
//!
//! 提供 KOSPI/KOSDAQ 日K线图、当日指标和自选列表
//! 数据来源：KRX 股票列表、Naver 日K线

mod config;     // 配置
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务
mod views;      // 页面渲染

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::io;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::chart::CharmingRenderer;
use crate::services::dashboard::Dashboard;
use crate::services::market_data::{KrxNaverProvider, MarketData};
use crate::services::session::SessionStore;

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器，默认监听 0.0.0.0:8080
#[actix_web::main]
async fn main() -> io::Result<()> {
    let (config, source) = AppConfig::load();

    // 初始化日志系统，默认日志级别取自配置
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));
    source.log();

    let provider = KrxNaverProvider::new(config.provider.clone())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let data = MarketData::new(Arc::new(provider), &config.cache);
    let dashboard = web::Data::new(Dashboard::new(data, Box::new(CharmingRenderer)));
    let sessions = web::Data::new(SessionStore::new(config.cache.session_idle()));

    let bind_addr = config.bind_addr();
    log::info!("启动股票行情仪表盘服务，监听 {}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(dashboard.clone())
            .app_data(sessions.clone())
            .configure(handlers::config)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
