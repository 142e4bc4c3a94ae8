//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 行情数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// KRX 股票列表接口
    #[serde(default = "default_krx_url")]
    pub krx_url: String,
    /// Naver 日K线接口
    #[serde(default = "default_naver_url")]
    pub naver_url: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 缓存过期时间配置（秒）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_symbols_ttl")]
    pub symbols_ttl_secs: u64,
    #[serde(default = "default_ohlcv_ttl")]
    pub ohlcv_ttl_secs: u64,
    #[serde(default = "default_snapshot_ttl")]
    pub snapshot_ttl_secs: u64,
    /// 会话空闲淘汰时间
    #[serde(default = "default_session_idle")]
    pub session_idle_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据源配置
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 缓存配置
    #[serde(default)]
    pub cache: CacheConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_krx_url() -> String { "http://data.krx.co.kr/comm/bldAttendant/getJsonData.cmd".to_string() }
fn default_naver_url() -> String { "https://fchart.stock.naver.com/sise.nhn".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_symbols_ttl() -> u64 { 60 * 15 }
fn default_ohlcv_ttl() -> u64 { 60 * 10 }
fn default_snapshot_ttl() -> u64 { 60 * 5 }
fn default_session_idle() -> u64 { 60 * 30 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            krx_url: default_krx_url(),
            naver_url: default_naver_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            symbols_ttl_secs: default_symbols_ttl(),
            ohlcv_ttl_secs: default_ohlcv_ttl(),
            snapshot_ttl_secs: default_snapshot_ttl(),
            session_idle_secs: default_session_idle(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl CacheConfig {
    pub fn symbols_ttl(&self) -> Duration { Duration::from_secs(self.symbols_ttl_secs) }
    pub fn ohlcv_ttl(&self) -> Duration { Duration::from_secs(self.ohlcv_ttl_secs) }
    pub fn snapshot_ttl(&self) -> Duration { Duration::from_secs(self.snapshot_ttl_secs) }
    pub fn session_idle(&self) -> Duration { Duration::from_secs(self.session_idle_secs) }
}

/// 配置来源
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(String),
    /// 使用默认配置，附带加载失败的文件及原因
    Default { failures: Vec<(String, String)> },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => log::info!("从 {} 加载配置成功", path),
            ConfigSource::Default { failures } => {
                for (path, e) in failures {
                    log::warn!("加载配置文件 {} 失败: {}", path, e);
                }
                log::info!("使用默认配置");
            }
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 此时日志尚未初始化，加载过程通过 `ConfigSource` 返回，由调用方记录
    pub fn load() -> (Self, ConfigSource) {
        Self::load_from(&["config.json", "config/config.json"])
    }

    pub fn load_from<P: AsRef<Path>>(paths: &[P]) -> (Self, ConfigSource) {
        let mut failures = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => return (config, ConfigSource::File(path.display().to_string())),
                    Err(e) => failures.push((path.display().to_string(), e.to_string())),
                }
            }
        }

        (Self::default(), ConfigSource::Default { failures })
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
