//! 数据模型定义

mod ledger;
mod order;
mod user;

pub use ledger::{LedgerEntry, Operation};
pub use order::{Order, OrderStatus};
pub use user::User;
