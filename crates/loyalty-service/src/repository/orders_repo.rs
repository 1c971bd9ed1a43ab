//! 订单仓储

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::{Order, OrderStatus};

/// 订单仓储
///
/// 订单由上传流程创建、由货币服务独占修改、永不删除。
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建订单
    ///
    /// 幂等：订单号冲突时不报错而返回 `None`，由调用方区分
    /// 「当前用户重复上传」与「他人已上传」。
    pub async fn create(&self, number: i64, user_id: i32) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (number, user_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING number, user_id, uploaded_at, status, accrual
            "#,
        )
        .bind(number)
        .bind(user_id)
        .bind(OrderStatus::New)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    pub async fn get_by_number(&self, number: i64) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT number, user_id, uploaded_at, status, accrual
            FROM orders
            WHERE number = $1
            "#,
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// 列出用户的全部订单，按上传时间升序
    pub async fn list_by_user(&self, user_id: i32) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT number, user_id, uploaded_at, status, accrual
            FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// 列出所有非终态订单，供轮询器使用
    ///
    /// 终态（INVALID/PROCESSED）被过滤掉，保证轮询器永不重入已结束的订单。
    pub async fn list_non_terminal(&self) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT number, user_id, uploaded_at, status, accrual
            FROM orders
            WHERE status NOT IN ('INVALID', 'PROCESSED')
            ORDER BY uploaded_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// 在事务中按主键更新订单状态与积分额
    ///
    /// 返回受影响行数；0 行意味着订单不存在。
    pub async fn update_in_tx(
        conn: &mut PgConnection,
        number: i64,
        status: OrderStatus,
        accrual: Option<Decimal>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = $1, accrual = $2 WHERE number = $3
            "#,
        )
        .bind(status)
        .bind(accrual)
        .bind(number)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
