//! 配置系统
//! 从默认值、.env 文件和环境变量加载配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8000"
    pub addr: String,
    /// 请求体大小上限（字节）
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Option<Secret<String>>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
    /// 启动服务时是否自动执行迁移
    pub auto_migrate: bool,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 路由前缀，例如 "/api/v1"
    pub prefix: String,
    /// 服务名称，用于根路径欢迎信息
    pub app_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:8000")?
            .set_default("server.max_body_bytes", 1024 * 1024)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("database.auto_migrate", false)?
            .set_default("storage.backend", "postgres")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("api.prefix", "/api/v1")?
            .set_default("api.app_name", "Entitlements Service")?;

        // 兼容通用的 DATABASE_URL
        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings = settings.set_default("database.url", url)?;
        }

        // 从环境变量加载配置（前缀为 ENT_）
        settings = settings.add_source(
            Environment::with_prefix("ENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // postgres 后端必须提供连接串
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Message(
                "database.url is required when storage.backend is postgres".to_string(),
            ));
        }

        if !self.api.prefix.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "Invalid api prefix: {}. Must start with '/'",
                self.api.prefix
            )));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Message("max_body_bytes must be > 0".to_string()));
        }

        Ok(())
    }

    /// 集合路由路径，例如 "/api/v1/entitlements"
    pub fn entitlements_path(&self) -> String {
        format!("{}/entitlements", self.api.prefix.trim_end_matches('/'))
    }
}
