//! 货币服务
//!
//! 系统中所有余额变动的唯一入口。两类原子操作：
//! - `accrue`：按外部积分计算服务的判定更新订单，并在订单完成时
//!   给用户入账、写账本流水；
//! - `withdraw`：从用户余额中扣减积分并写账本流水。
//!
//! 每个操作在单个数据库事务内同时更新订单/用户/账本三张表，
//! 任一步失败即整体回滚。

use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::{info, instrument};

use loyalty_shared::database::Database;

use crate::error::{Result, ServiceError};
use crate::models::{Operation, Order, OrderStatus};
use crate::repository::{LedgerRepository, OrderRepository, UserRepository};

/// 货币服务
#[derive(Clone)]
pub struct MoneyService {
    db: Database,
}

impl MoneyService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 订单积分入账
    ///
    /// 在单个事务内：
    /// 1. 按主键更新订单的状态与积分额，0 行受影响 -> `NoSuchOrder`；
    /// 2. 订单状态为 PROCESSED 且积分额为正时，给用户余额加上该积分额，
    ///    0 行受影响 -> `NoSuchUser`；
    /// 3. 追加一条 debit 账本流水。
    ///
    /// 积分额为空或为零（状态非 PROCESSED）时跳过第 2、3 步，
    /// 但第 1 步的状态落库仍然发生。
    #[instrument(skip(self, order), fields(order_number = order.number, status = ?order.status))]
    pub async fn accrue(&self, order: &Order) -> Result<()> {
        let number = order.number;
        let user_id = order.user_id;
        let status = order.status;
        let accrual = order.accrual;

        self.db
            .transaction(move |conn: &mut PgConnection| {
                Box::pin(async move {
                    let rows =
                        OrderRepository::update_in_tx(&mut *conn, number, status, accrual).await?;
                    if rows == 0 {
                        return Err(ServiceError::NoSuchOrder(number));
                    }

                    let credit = match accrual {
                        Some(value) if status == OrderStatus::Processed && value > Decimal::ZERO => {
                            value
                        }
                        // 无积分可入账，只落订单状态
                        _ => return Ok(()),
                    };

                    let rows =
                        UserRepository::credit_balance_in_tx(&mut *conn, user_id, credit).await?;
                    if rows == 0 {
                        return Err(ServiceError::NoSuchUser(user_id));
                    }

                    LedgerRepository::add_in_tx(
                        &mut *conn,
                        user_id,
                        number,
                        Operation::Debit,
                        credit,
                    )
                    .await?;

                    Ok(())
                })
            })
            .await?;

        info!(
            order_number = number,
            user_id,
            status = ?status,
            accrual = ?accrual,
            "订单积分入账完成"
        );

        Ok(())
    }

    /// 积分消费
    ///
    /// 在单个事务内：
    /// 1. 读取用户余额，用户缺失 -> `NoSuchUser`；
    /// 2. 余额小于消费额 -> `InsufficientFunds`；
    /// 3. 带 `balance >= sum` 守卫的扣减更新。守卫才是真正的仲裁者：
    ///    并发消费在用户行写锁处串行化，守卫不满足即 0 行受影响，
    ///    同样映射为 `InsufficientFunds`；
    /// 4. 追加一条 credit 账本流水。
    ///
    /// 调用方保证 `sum > 0` 且订单号语法合法（完整 Luhn 校验在 HTTP
    /// 处理器完成，此处不重复）。
    #[instrument(skip(self))]
    pub async fn withdraw(&self, user_id: i32, order_number: i64, sum: Decimal) -> Result<()> {
        self.db
            .transaction(move |conn: &mut PgConnection| {
                Box::pin(async move {
                    let balance = UserRepository::get_balance_in_tx(&mut *conn, user_id)
                        .await?
                        .ok_or(ServiceError::NoSuchUser(user_id))?;

                    // 预检只是快速失败；并发下的最终裁决在下面的守卫更新
                    if balance < sum {
                        return Err(ServiceError::InsufficientFunds);
                    }

                    let rows = UserRepository::withdraw_in_tx(&mut *conn, user_id, sum).await?;
                    if rows == 0 {
                        return Err(ServiceError::InsufficientFunds);
                    }

                    LedgerRepository::add_in_tx(
                        &mut *conn,
                        user_id,
                        order_number,
                        Operation::Credit,
                        sum,
                    )
                    .await?;

                    Ok(())
                })
            })
            .await?;

        info!(user_id, order_number, sum = %sum, "积分消费完成");

        Ok(())
    }
}
