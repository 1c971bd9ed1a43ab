//! HTTP 处理器

pub mod auth;
pub mod balance;
pub mod orders;
