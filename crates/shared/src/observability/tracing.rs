//! 日志初始化
//!
//! 基于 tracing-subscriber 构建订阅者：EnvFilter 控制级别，
//! 输出格式在 json（结构化）与 pretty（人类可读）之间切换。

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::ObservabilityConfig;
use crate::error::InfraError;

/// 初始化全局日志订阅者
///
/// `RUST_LOG` 环境变量优先于配置中的 log_level。
pub fn init(config: &ObservabilityConfig) -> Result<(), InfraError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.log_format == "json" {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| InfraError::Observability(e.to_string()))
}
