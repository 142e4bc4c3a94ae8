//! 业务逻辑服务模块
//!
//! 封装参数解析、状态机、行情数据获取与图表渲染

pub mod cache;       // 带过期时间的缓存
pub mod chart;       // K线图渲染
pub mod dashboard;   // 仪表盘渲染流程
pub mod market_data; // 行情数据源
pub mod mav;         // 均线周期解析
pub mod session;     // 草稿/生效参数状态机
pub mod snapshot;    // 当日指标计算
