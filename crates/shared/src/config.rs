//! 配置管理模块
//!
//! 支持配置文件加载与环境变量覆盖。命令行参数由二进制入口解析后
//! 通过 [`AppConfig`] 的字段覆盖写入，最终优先级为：
//! 命令行参数 > 环境变量 > 配置文件 > 默认值。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// 应用配置
///
/// 识别的环境变量与字段一一对应：`RUN_ADDRESS`、`DATABASE_URI`、
/// `ACCRUAL_SYSTEM_ADDRESS`、`COOKIE_DOMAIN`、`DB_CONNECT_TIMEOUT`、
/// `DB_QUERY_TIMEOUT`、`PASSWORD_SECRET`。超时单位为秒。
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP 监听地址
    pub run_address: String,
    /// PostgreSQL DSN
    pub database_uri: String,
    /// 外部积分计算服务的基础地址
    pub accrual_system_address: String,
    /// 认证 Cookie 的 Domain 属性
    pub cookie_domain: String,
    /// 数据库连接超时（秒）
    pub db_connect_timeout: u64,
    /// 单条查询超时（秒），通过 statement_timeout 在服务端生效
    pub db_query_timeout: u64,
    /// 密码哈希与 Cookie 签名共用的密钥
    pub password_secret: String,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            run_address: "localhost:8080".to_string(),
            database_uri: String::new(),
            accrual_system_address: "http://localhost:7979".to_string(),
            cookie_domain: "localhost".to_string(),
            db_connect_timeout: 1,
            db_query_timeout: 1,
            password_secret: "forum-prefix-guitar".to_string(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的覆盖先加载的同名配置项）：
    /// 1. 内置默认值
    /// 2. config/default.toml（可选）
    /// 3. 环境变量（`RUN_ADDRESS` -> `run_address` 等）
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let defaults = Self::default();

        let builder = Config::builder()
            .set_default("run_address", defaults.run_address)?
            .set_default("database_uri", defaults.database_uri)?
            .set_default("accrual_system_address", defaults.accrual_system_address)?
            .set_default("cookie_domain", defaults.cookie_domain)?
            .set_default("db_connect_timeout", defaults.db_connect_timeout)?
            .set_default("db_query_timeout", defaults.db_query_timeout)?
            .set_default("password_secret", defaults.password_secret)?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .set_default("observability.log_format", defaults.observability.log_format)?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(Environment::default().try_parsing(true));

        let mut config: Self = builder.build()?.try_deserialize()?;

        // 日志配置使用独立的环境变量名，不经过 config 的键映射
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.observability.log_format = format;
        }

        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.db_query_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.run_address, "localhost:8080");
        assert_eq!(config.accrual_system_address, "http://localhost:7979");
        assert_eq!(config.cookie_domain, "localhost");
        assert_eq!(config.db_connect_timeout, 1);
        assert_eq!(config.db_query_timeout, 1);
    }

    #[test]
    fn test_timeout_durations() {
        let config = AppConfig {
            db_connect_timeout: 3,
            db_query_timeout: 2,
            ..Default::default()
        };
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.query_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_observability() {
        let obs = ObservabilityConfig::default();
        assert_eq!(obs.log_level, "info");
        assert_eq!(obs.log_format, "pretty");
    }
}
