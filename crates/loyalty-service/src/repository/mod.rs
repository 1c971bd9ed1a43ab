//! 仓储层
//!
//! 每张表由且仅由对应仓储访问；货币服务不会绕过仓储直接写表。
//! 带 `_in_tx` 后缀的关联函数在调用方提供的事务连接上执行，
//! 供跨表的事务性流程组合使用。

mod ledger_repo;
mod orders_repo;
mod users_repo;

pub use ledger_repo::LedgerRepository;
pub use orders_repo::OrderRepository;
pub use users_repo::UserRepository;
