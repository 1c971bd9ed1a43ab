//! 余额与积分消费处理器

use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;

use crate::dto::{BalanceResponse, WithdrawRequest, WithdrawalResponse};
use crate::error::{Result, ServiceError};
use crate::handlers::orders::parse_order_number;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// 查询当前余额与累计消费
///
/// GET /api/user/balance
///
/// 认证中间件每次请求都重新加载用户行，余额是最新值。
pub async fn get_balance(Extension(auth): Extension<AuthUser>) -> Json<BalanceResponse> {
    let user = auth.0;
    Json(BalanceResponse {
        current: user.balance,
        withdrawn: user.withdrawn,
    })
}

/// 积分消费
///
/// POST /api/user/balance/withdraw，请求体 `{"order":"…","sum":…}`
///
/// 订单号做完整的数字 + Luhn 校验（422），金额必须为正（400），
/// 余额不足由货币服务报出并映射为 402。
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Bytes,
) -> Result<Response> {
    let req: WithdrawRequest =
        serde_json::from_slice(&body).map_err(|e| ServiceError::JsonParse(e.to_string()))?;

    let order_number = parse_order_number(&req.order)?;
    if req.sum <= Decimal::ZERO {
        return Err(ServiceError::RequestInvalid("消费金额必须为正".to_string()));
    }

    state.money.withdraw(auth.0.id, order_number, req.sum).await?;

    Ok(StatusCode::OK.into_response())
}

/// 列出当前用户的积分消费记录
///
/// GET /api/user/balance/withdrawals；没有记录时返回 204
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response> {
    let entries = state.ledger.list_withdrawals_by_user(auth.0.id).await?;

    if entries.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<WithdrawalResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(body).into_response())
}
