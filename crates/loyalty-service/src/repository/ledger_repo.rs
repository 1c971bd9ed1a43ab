//! 账本仓储
//!
//! 采用复式记账思想：余额的每一次变动都留下一条只追加的流水，
//! 保证 `users.balance`、`users.withdrawn` 随时可与流水对账。

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{LedgerEntry, Operation};

/// 账本仓储
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中追加一条账本记录
    ///
    /// 表无唯一约束，插入永不冲突。
    pub async fn add_in_tx(
        conn: &mut PgConnection,
        user_id: i32,
        order_number: i64,
        operation: Operation,
        value: Decimal,
    ) -> Result<LedgerEntry> {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger (user_id, order_number, operation, value)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, order_number, processed_at, operation, value
            "#,
        )
        .bind(user_id)
        .bind(order_number)
        .bind(operation)
        .bind(value)
        .fetch_one(conn)
        .await?;

        Ok(entry)
    }

    /// 列出用户的积分消费记录，按处理时间升序
    pub async fn list_withdrawals_by_user(&self, user_id: i32) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, order_number, processed_at, operation, value
            FROM ledger
            WHERE user_id = $1 AND operation = $2
            ORDER BY processed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(Operation::Credit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
