//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态。所有协作者都在这里显式注入，
//! 不存在进程级全局状态。

use loyalty_shared::config::AppConfig;
use loyalty_shared::database::Database;

use crate::auth::CookieSigner;
use crate::repository::{LedgerRepository, OrderRepository, UserRepository};
use crate::service::MoneyService;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderRepository,
    pub users: UserRepository,
    pub ledger: LedgerRepository,
    pub money: MoneyService,
    pub cookies: CookieSigner,
    /// 密码哈希密钥，与 Cookie 签名共用配置中的 PASSWORD_SECRET
    pub password_secret: String,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        Self {
            orders: OrderRepository::new(db.pool().clone()),
            users: UserRepository::new(db.pool().clone()),
            ledger: LedgerRepository::new(db.pool().clone()),
            money: MoneyService::new(db.clone()),
            cookies: CookieSigner::new(&config.password_secret, &config.cookie_domain),
            password_secret: config.password_secret.clone(),
        }
    }
}
