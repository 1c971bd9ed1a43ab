//! 外部积分计算服务接入

mod client;

pub use client::{AccrualApi, AccrualClient, AccrualError, AccrualOrder, AccrualReply};

#[cfg(test)]
pub use client::MockAccrualApi;
