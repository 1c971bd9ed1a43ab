//! 积分轮询 Worker
//!
//! 单个长驻协作式任务：每轮扫描所有非终态订单，逐个向外部积分计算
//! 服务查询判定，状态有变化时交给货币服务落库。
//!
//! 设计上同一时刻只有一个在途请求：外部服务通过 `Retry-After` 公告
//! 限流，串行查询 + 每单固定间隔是刻意的朴素限速。
//!
//! 失败语义：每单失败只影响该单（记日志后继续下一单或下一轮）；
//! 429 顺延本轮剩余订单但不影响系统其他部分；卡死在非终态的订单
//! 会被无限期重试，没有死信队列。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use loyalty_shared::database::Database;

use crate::accrual::{AccrualApi, AccrualOrder, AccrualReply};
use crate::error::ServiceError;
use crate::models::{Order, OrderStatus};
use crate::repository::OrderRepository;
use crate::service::MoneyService;

/// 两轮扫描之间与两单查询之间的固定间隔
const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// 对一次判定结果的处理决策
#[derive(Debug, PartialEq)]
enum ReplyAction {
    /// 状态有变化，需要落库
    Update {
        status: OrderStatus,
        accrual: Option<rust_decimal::Decimal>,
    },
    /// 响应订单号与请求不一致
    NumberMismatch,
    /// 状态未变化，无事可做
    Unchanged,
}

/// 判定结果归类
///
/// 不落库的两种情况：服务返回了别的订单（异常，记日志跳过）、
/// 状态与本地一致（订单尚未推进）。
fn classify_reply(order: &Order, reply: &AccrualOrder) -> ReplyAction {
    if reply.order != order.number.to_string() {
        return ReplyAction::NumberMismatch;
    }
    if reply.status == order.status {
        return ReplyAction::Unchanged;
    }
    ReplyAction::Update {
        status: reply.status,
        accrual: reply.accrual,
    }
}

/// 积分轮询 Worker
pub struct AccrualWorker {
    orders: OrderRepository,
    money: MoneyService,
    client: Arc<dyn AccrualApi>,
    pass_interval: Duration,
    order_interval: Duration,
}

impl AccrualWorker {
    pub fn new(db: Database, client: Arc<dyn AccrualApi>) -> Self {
        Self {
            orders: OrderRepository::new(db.pool().clone()),
            money: MoneyService::new(db),
            client,
            pass_interval: DEFAULT_PACING,
            order_interval: DEFAULT_PACING,
        }
    }

    /// 覆盖轮询间隔（测试用）
    pub fn with_intervals(mut self, pass_interval: Duration, order_interval: Duration) -> Self {
        self.pass_interval = pass_interval;
        self.order_interval = order_interval;
        self
    }

    /// 主循环：持续轮询直到进程退出
    pub async fn run(&self) {
        info!(
            pass_interval = ?self.pass_interval,
            order_interval = ?self.order_interval,
            "积分轮询器已启动"
        );

        loop {
            // 先睡后干活：每个 continue 路径都无需再补一次 sleep
            tokio::time::sleep(self.pass_interval).await;
            self.run_pass().await;
        }
    }

    /// 单轮扫描
    ///
    /// 数据库错误中止本轮；429 在等待后顺延本轮剩余订单；
    /// 其余失败只跳过当前订单。
    #[instrument(skip(self))]
    pub async fn run_pass(&self) {
        let orders = match self.orders.list_non_terminal().await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "查询待处理订单失败");
                return;
            }
        };

        self.process_orders(orders).await;
    }

    /// 逐单查询并落库
    async fn process_orders(&self, orders: Vec<Order>) {
        for order in orders {
            tokio::time::sleep(self.order_interval).await;

            let reply = match self.client.order_status(order.number).await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(order_number = order.number, error = %e, "查询积分计算服务失败");
                    continue;
                }
            };

            match reply {
                AccrualReply::Verdict(verdict) => self.apply_verdict(order, verdict).await,
                AccrualReply::RateLimited {
                    retry_after: Some(seconds),
                } => {
                    warn!(seconds, "积分计算服务限流，本轮剩余订单顺延");
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                    return;
                }
                AccrualReply::RateLimited { retry_after: None } => {
                    error!(
                        order_number = order.number,
                        "Retry-After 头无法解析，跳过该订单"
                    );
                }
                AccrualReply::Unknown => {
                    debug!(order_number = order.number, "积分计算服务暂无结论");
                }
            }
        }
    }

    /// 将判定结果落库
    async fn apply_verdict(&self, mut order: Order, verdict: AccrualOrder) {
        match classify_reply(&order, &verdict) {
            ReplyAction::NumberMismatch => {
                error!(
                    requested = order.number,
                    returned = %verdict.order,
                    "响应订单号与请求不一致"
                );
            }
            ReplyAction::Unchanged => {
                debug!(order_number = order.number, status = ?order.status, "状态未变化");
            }
            ReplyAction::Update { status, accrual } => {
                order.status = status;
                order.accrual = accrual;

                match self.money.accrue(&order).await {
                    Ok(()) => {
                        info!(
                            order_number = order.number,
                            status = ?status,
                            accrual = ?accrual,
                            "订单状态已更新"
                        );
                    }
                    // 引用完整性保证此分支不应出现
                    Err(ServiceError::NoSuchUser(user_id)) => {
                        error!(order_number = order.number, user_id, "订单对应的用户不存在");
                    }
                    Err(e) => {
                        error!(order_number = order.number, error = %e, "订单入账失败");
                    }
                }
            }
        }
    }
}
