//! 订单模型
//!
//! 订单号在 HTTP 边界以字符串交换（部分客户端的 number 类型会丢失精度），
//! 存储为 bigint 主键。终态订单（INVALID/PROCESSED）不再被轮询器触碰。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 订单状态
///
/// REGISTERED 是外部积分计算服务报告的过渡状态，本地语义等同于
/// PROCESSING，但作为独立变体持久化，避免服务报告该状态时写入失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    /// 是否为终态。终态一经进入便不再离开。
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }
}

/// 订单
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub number: i64,
    pub user_id: i32,
    pub uploaded_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub accrual: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Invalid.is_terminal());
        assert!(OrderStatus::Processed.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::Registered.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
    }

    #[test]
    fn test_status_serde_uppercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processed).unwrap(),
            "\"PROCESSED\""
        );
        let status: OrderStatus = serde_json::from_str("\"REGISTERED\"").unwrap();
        assert_eq!(status, OrderStatus::Registered);
    }
}
