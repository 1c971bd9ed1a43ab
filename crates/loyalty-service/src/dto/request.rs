//! 请求 DTO

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// 注册/登录请求
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(length(min = 1, message = "登录名不能为空"))]
    pub login: String,
    #[validate(length(min = 1, message = "密码不能为空"))]
    pub password: String,
}

/// 积分消费请求
///
/// 订单号以字符串交换；金额接受不带引号的 JSON 数字。
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}
