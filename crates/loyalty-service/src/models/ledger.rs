//! 账本模型
//!
//! 账本只追加，是对账 `users.balance` 与 `users.withdrawn` 的唯一事实来源。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 账本操作类型
///
/// 内部约定：debit = 积分进入用户账户（积分发放），
/// credit = 积分离开用户账户（积分消费）。与银行记账方向相反。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Debit,
    Credit,
}

/// 账本条目
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: i32,
    pub user_id: i32,
    pub order_number: i64,
    pub processed_at: DateTime<Utc>,
    pub operation: Operation,
    pub value: Decimal,
}
