//! Mock 积分计算服务
//!
//! 模拟外部积分计算服务的最小实现，用于本地开发与端到端测试：
//! - `GET /api/orders/{number}`：返回预设判定（200）或 204；
//! - `POST /api/orders`：预设一条订单判定；
//! - `POST /api/throttle`：让接下来的 N 次查询返回 429 + Retry-After，
//!   用于验证调用方的限流顺延行为。

pub mod routes;
pub mod store;
