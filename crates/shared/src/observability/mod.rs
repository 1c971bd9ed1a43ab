//! 可观测性模块
//!
//! 提供结构化日志初始化。

mod tracing;

pub use tracing::init;
