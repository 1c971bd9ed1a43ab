//! 积分计算服务 HTTP 客户端
//!
//! 单次尝试的阻塞式 GET `{base}/api/orders/{number}`。
//! `Retry-After` 头只在 429 响应上被读取，且必须是非负整数秒；
//! 无法解析的值以 `retry_after: None` 上报，由轮询器跳过该订单且不等待。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::OrderStatus;

/// 积分计算服务对单个订单的判定
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualOrder {
    /// 订单号（服务端以字符串返回）
    pub order: String,
    pub status: OrderStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub accrual: Option<Decimal>,
}

/// 对一次查询结果的归类
#[derive(Debug, Clone)]
pub enum AccrualReply {
    /// 200：携带判定结果
    Verdict(AccrualOrder),
    /// 429：限流，`retry_after` 为解析后的等待秒数，头非法时为 None
    RateLimited { retry_after: Option<u64> },
    /// 204 或其他状态：订单未注册或暂无结论
    Unknown,
}

/// 客户端错误
#[derive(Debug, thiserror::Error)]
pub enum AccrualError {
    #[error("请求积分计算服务失败: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("积分计算服务响应无法解析: {0}")]
    Decode(String),
}

/// 积分计算服务接口
///
/// 轮询器通过 trait object 依赖本接口，测试中以 mock 替换真实 HTTP 调用。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccrualApi: Send + Sync {
    async fn order_status(&self, number: i64) -> Result<AccrualReply, AccrualError>;
}

/// HTTP 客户端实现
pub struct AccrualClient {
    client: Client,
    base_url: String,
}

impl AccrualClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("创建 HTTP 客户端失败");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AccrualApi for AccrualClient {
    async fn order_status(&self, number: i64) -> Result<AccrualReply, AccrualError> {
        let url = format!("{}/api/orders/{}", self.base_url, number);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let verdict: AccrualOrder = response
                    .json()
                    .await
                    .map_err(|e| AccrualError::Decode(e.to_string()))?;
                Ok(AccrualReply::Verdict(verdict))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after);
                Ok(AccrualReply::RateLimited { retry_after })
            }
            // 204 与其余状态一视同仁：该订单本轮无事可做
            _ => Ok(AccrualReply::Unknown),
        }
    }
}

/// 解析 Retry-After 头为非负整数秒
fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
