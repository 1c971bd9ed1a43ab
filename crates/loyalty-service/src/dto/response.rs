//! 响应 DTO
//!
//! 订单号序列化为字符串（部分客户端的 number 类型会丢失精度），
//! 金额序列化为不带引号的 JSON 数字，时间戳为 RFC3339。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{LedgerEntry, Order, OrderStatus};

/// 订单响应
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatus,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub accrual: Option<Decimal>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            number: order.number.to_string(),
            status: order.status,
            accrual: order.accrual,
            uploaded_at: order.uploaded_at,
        }
    }
}

/// 余额响应
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawn: Decimal,
}

/// 消费记录响应
#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub order: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    pub processed_at: DateTime<Utc>,
}

impl From<LedgerEntry> for WithdrawalResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            order: entry.order_number.to_string(),
            sum: entry.value,
            processed_at: entry.processed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use chrono::TimeZone;

    #[test]
    fn test_order_response_shape() {
        let order = Order {
            number: 12345678903,
            user_id: 1,
            uploaded_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            status: OrderStatus::Processed,
            accrual: Some(Decimal::from(500)),
        };

        let value = serde_json::to_value(OrderResponse::from(order)).unwrap();

        // 订单号是字符串，积分额是不带引号的数字
        assert_eq!(value["number"], serde_json::json!("12345678903"));
        assert_eq!(value["status"], serde_json::json!("PROCESSED"));
        assert_eq!(value["accrual"], serde_json::json!(500.0));
        assert_eq!(
            value["uploaded_at"],
            serde_json::json!("2024-03-01T12:00:00Z")
        );
    }

    #[test]
    fn test_order_response_omits_null_accrual() {
        let order = Order {
            number: 2377225624,
            user_id: 1,
            uploaded_at: Utc::now(),
            status: OrderStatus::New,
            accrual: None,
        };

        let value = serde_json::to_value(OrderResponse::from(order)).unwrap();
        assert!(value.get("accrual").is_none());
    }

    #[test]
    fn test_balance_response_unquoted_decimals() {
        let response = BalanceResponse {
            current: Decimal::new(30050, 2),
            withdrawn: Decimal::from(200),
        };

        let text = serde_json::to_string(&response).unwrap();
        assert_eq!(text, r#"{"current":300.5,"withdrawn":200.0}"#);
    }

    #[test]
    fn test_withdrawal_response_from_entry() {
        let entry = LedgerEntry {
            id: 1,
            user_id: 1,
            order_number: 2377225624,
            processed_at: Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap(),
            operation: Operation::Credit,
            value: Decimal::from(200),
        };

        let value = serde_json::to_value(WithdrawalResponse::from(entry)).unwrap();
        assert_eq!(value["order"], serde_json::json!("2377225624"));
        assert_eq!(value["sum"], serde_json::json!(200.0));
        assert_eq!(
            value["processed_at"],
            serde_json::json!("2024-03-02T09:30:00Z")
        );
    }
}
