//! 认证组件
//!
//! 密码哈希与签名 Cookie。两者共用配置中的 `PASSWORD_SECRET`。

mod cookie;
mod password;

pub use cookie::{CookieSigner, AUTH_COOKIE_NAME};
pub use password::{hash_password, verify_password};
