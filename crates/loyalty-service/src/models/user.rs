//! 用户模型

use rust_decimal::Decimal;

/// 用户
///
/// `password` 存储形如 `1:` + base64(Argon2id) 的哈希，永不明文。
/// `balance` 与 `withdrawn` 由数据库约束保证非负。
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub login: String,
    pub password: String,
    pub balance: Decimal,
    pub withdrawn: Decimal,
}
