//! 数据库连接管理模块
//!
//! 提供 PostgreSQL 连接池管理、闭包式事务助手与表结构初始化。
//!
//! 事务语义：`transaction` 在闭包返回 `Ok` 时提交，返回 `Err` 时回滚；
//! 回滚自身失败会以结构化日志记录，原始错误继续向上传播。
//! 单条查询的超时通过连接级 `statement_timeout` 在服务端强制执行，
//! 超时表现为一条普通的数据库错误并使外层事务中止。

use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::PgConnection;
use tracing::{error, info, instrument};

use crate::config::AppConfig;
use crate::error::{InfraError, Result};

/// 数据库连接池包装
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 创建数据库连接池
    ///
    /// 连接超时与查询超时均来自配置；查询超时以 `statement_timeout`
    /// 形式写入每条连接的会话参数。
    #[instrument(skip(config))]
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        info!("Connecting to database...");

        let options = config
            .database_uri
            .parse::<PgConnectOptions>()?
            .options([(
                "statement_timeout",
                format!("{}", config.query_timeout().as_millis()),
            )]);

        let pool = PgPoolOptions::new()
            .acquire_timeout(config.connect_timeout())
            .connect_with(options)
            .await?;

        info!("Database connection pool created");

        Ok(Self { pool })
    }

    /// 从已有连接池构造（测试用）
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取连接池引用
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 在单个事务内执行闭包
    ///
    /// 闭包拿到的是绑定在事务上的连接，期间的所有读写同属一个事务；
    /// 嵌套事务在类型层面不可表达。错误类型只要求能承载 sqlx 错误，
    /// 业务错误原样穿透。
    pub async fn transaction<T, E, F>(&self, op: F) -> std::result::Result<T, E>
    where
        E: From<sqlx::Error>,
        F: for<'t> FnOnce(&'t mut PgConnection) -> BoxFuture<'t, std::result::Result<T, E>>,
    {
        let mut tx = self.pool.begin().await.map_err(E::from)?;

        match op(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                // 回滚失败不能吞掉触发回滚的原始错误
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "事务回滚失败，原始错误继续传播");
                }
                Err(err)
            }
        }
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(InfraError::from)
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }

    /// 初始化表结构
    ///
    /// 所有语句均可重复执行。`order_status` 枚举显式包含 REGISTERED，
    /// 这样外部服务报告该状态时写入不会失败。
    #[instrument(skip(self))]
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema...");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id          serial PRIMARY KEY,
                login       text NOT NULL,
                password    text NOT NULL,
                balance     numeric(8,2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
                withdrawn   numeric(8,2) NOT NULL DEFAULT 0 CHECK (withdrawn >= 0)
            )
            "#,
            r#"CREATE UNIQUE INDEX IF NOT EXISTS users_login_idx ON users (login)"#,
            r#"
            DO $$
            BEGIN
                IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'order_status') THEN
                    CREATE TYPE order_status AS enum ('NEW','REGISTERED','PROCESSING','INVALID','PROCESSED');
                END IF;
            END$$
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                number      bigint PRIMARY KEY,
                user_id     integer NOT NULL,
                uploaded_at timestamp with time zone NOT NULL DEFAULT now(),
                status      order_status NOT NULL,
                accrual     numeric(8,2)
            )
            "#,
            r#"CREATE INDEX IF NOT EXISTS orders_user_id_uploaded_at_idx ON orders (user_id, uploaded_at ASC)"#,
            r#"
            DO $$
            BEGIN
                IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'transaction_type') THEN
                    CREATE TYPE transaction_type AS enum ('debit','credit');
                END IF;
            END$$
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS ledger (
                id              serial PRIMARY KEY,
                user_id         integer NOT NULL,
                order_number    bigint NOT NULL,
                processed_at    timestamp with time zone NOT NULL DEFAULT now(),
                operation       transaction_type NOT NULL,
                value           numeric(8,2) NOT NULL
            )
            "#,
            r#"CREATE INDEX IF NOT EXISTS ledger_user_id_processed_at_idx ON ledger (user_id, processed_at ASC)"#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Database schema is up to date");
        Ok(())
    }
}

impl std::ops::Deref for Database {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
