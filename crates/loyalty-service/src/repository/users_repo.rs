//! 用户仓储

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::Result;
use crate::models::User;

/// 用户仓储
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建用户
    ///
    /// 登录名冲突时不报错而返回 `None`。
    pub async fn create(&self, login: &str, password_hash: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING id, login, password, balance, withdrawn
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password, balance, withdrawn FROM users WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, password, balance, withdrawn FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// 在事务中读取用户余额
    pub async fn get_balance_in_tx(
        conn: &mut PgConnection,
        user_id: i32,
    ) -> Result<Option<Decimal>> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT balance FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(balance)
    }

    /// 在事务中给用户余额加上积分额
    ///
    /// 返回受影响行数；0 行意味着用户不存在。
    pub async fn credit_balance_in_tx(
        conn: &mut PgConnection,
        user_id: i32,
        amount: Decimal,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users SET balance = balance + $1 WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// 在事务中扣减余额并累加已消费计数
    ///
    /// `balance >= $1` 守卫是并发扣减下的真正仲裁者：两个事务在同一用户
    /// 行上的写锁处串行化，只有一个能满足守卫。返回 0 行即余额不足。
    pub async fn withdraw_in_tx(conn: &mut PgConnection, user_id: i32, sum: Decimal) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET balance = balance - $1, withdrawn = withdrawn + $1
            WHERE id = $2 AND balance >= $1
            "#,
        )
        .bind(sum)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
