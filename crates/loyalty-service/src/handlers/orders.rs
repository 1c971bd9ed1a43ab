//! 订单处理器

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use crate::dto::OrderResponse;
use crate::error::{Result, ServiceError};
use crate::luhn;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// 上传订单号
///
/// POST /api/user/orders（请求体为 text/plain 的订单号）
///
/// 状态码契约：202 新订单；200 当前用户重复上传；409 他人已上传；
/// 422 格式或 Luhn 校验失败。
pub async fn upload_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: String,
) -> Result<Response> {
    let user = auth.0;

    let number = parse_order_number(&body)?;

    if let Some(order) = state.orders.create(number, user.id).await? {
        info!(order_number = order.number, user_id = user.id, "订单已登记");
        return Ok(StatusCode::ACCEPTED.into_response());
    }

    // 插入冲突：查出已存在订单的归属再决定响应
    let existing = state
        .orders
        .get_by_number(number)
        .await?
        .ok_or(ServiceError::OrderCreateFailed(number))?;

    if existing.user_id == user.id {
        info!(order_number = number, user_id = user.id, "订单已由当前用户上传过");
        Ok(StatusCode::OK.into_response())
    } else {
        warn!(
            order_number = number,
            owner = existing.user_id,
            requester = user.id,
            "订单已由其他用户上传"
        );
        Err(ServiceError::OrderOwnedByAnotherUser)
    }
}

/// 列出当前用户的订单
///
/// GET /api/user/orders；没有订单时返回 204
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response> {
    let orders = state.orders.list_by_user(auth.0.id).await?;

    if orders.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(Json(body).into_response())
}

/// 校验并解析订单号
///
/// 纯数字、可表示为 i64、通过 Luhn 校验，三者缺一即 422。
pub(crate) fn parse_order_number(text: &str) -> Result<i64> {
    if !luhn::is_digits(text) {
        return Err(ServiceError::OrderFormatInvalid);
    }
    let number: i64 = text.parse().map_err(|_| ServiceError::OrderFormatInvalid)?;
    if !luhn::is_valid(text) {
        return Err(ServiceError::OrderFormatInvalid);
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_number() {
        assert_eq!(parse_order_number("12345678903").unwrap(), 12345678903);
        assert_eq!(parse_order_number("2377225624").unwrap(), 2377225624);
    }

    #[test]
    fn test_parse_order_number_rejects_bad_input() {
        // Luhn 校验失败
        assert!(matches!(
            parse_order_number("1234"),
            Err(ServiceError::OrderFormatInvalid)
        ));
        // 非数字
        assert!(matches!(
            parse_order_number("12a45"),
            Err(ServiceError::OrderFormatInvalid)
        ));
        // 带换行（客户端忘记去掉结尾空白）
        assert!(matches!(
            parse_order_number("12345678903\n"),
            Err(ServiceError::OrderFormatInvalid)
        ));
        // 超出 i64 表示范围
        assert!(matches!(
            parse_order_number("99999999999999999999999999"),
            Err(ServiceError::OrderFormatInvalid)
        ));
        assert!(matches!(
            parse_order_number(""),
            Err(ServiceError::OrderFormatInvalid)
        ));
    }
}
