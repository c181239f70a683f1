//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8080"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
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
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// 令牌签名密钥，必须由环境提供
    pub jwt_secret: Secret<String>,
    /// 会话令牌有效期（秒）
    pub token_ttl_secs: u64,
    /// bcrypt 成本因子
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

/// 默认会话有效期：15 分钟
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 900;

/// 会话有效期范围（秒）
pub const MIN_TOKEN_TTL_SECS: u64 = 60;
pub const MAX_TOKEN_TTL_SECS: u64 = 86400;

/// 默认 bcrypt 成本
pub const DEFAULT_BCRYPT_COST: u32 = 14;

/// bcrypt 接受的成本范围
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 签名密钥和数据库地址没有默认值
        settings = settings
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", DEFAULT_TOKEN_TTL_SECS)?
            .set_default("security.bcrypt_cost", DEFAULT_BCRYPT_COST)?;

        // 从环境变量加载配置（前缀为 HR_）
        settings = settings.add_source(
            Environment::with_prefix("HR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

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

        // HS256 密钥至少 32 字节
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if !(MIN_TOKEN_TTL_SECS..=MAX_TOKEN_TTL_SECS).contains(&self.security.token_ttl_secs) {
            return Err(ConfigError::Message(format!(
                "token_ttl_secs must be between {} and {} (1 minute to 24 hours)",
                MIN_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS
            )));
        }

        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "bcrypt_cost must be between {} and {}",
                BCRYPT_MIN_COST, BCRYPT_MAX_COST
            )));
        }

        Ok(())
    }
}
