//! 注册与登录处理器
//!
//! 两个接口成功时都在响应上种下签名认证 Cookie。

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::{hash_password, verify_password};
use crate::dto::AuthRequest;
use crate::error::{Result, ServiceError};
use crate::state::AppState;

/// 用户注册
///
/// POST /api/user/register
pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let req = parse_auth_request(&body)?;

    let hash = hash_password(&req.password, &state.password_secret)?;
    let user = state
        .users
        .create(&req.login, &hash)
        .await?
        .ok_or(ServiceError::LoginTaken)?;

    info!(login = %user.login, user_id = user.id, "新用户注册");

    Ok(authenticated_response(&state, &user.login))
}

/// 用户登录
///
/// POST /api/user/login
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let req = parse_auth_request(&body)?;

    let user = state
        .users
        .get_by_login(&req.login)
        .await?
        .ok_or(ServiceError::WrongCredentials)?;

    if !verify_password(&req.password, &state.password_secret, &user.password)? {
        warn!(login = %req.login, "密码校验失败");
        return Err(ServiceError::WrongCredentials);
    }

    Ok(authenticated_response(&state, &user.login))
}

/// 解析并校验注册/登录请求体
fn parse_auth_request(body: &[u8]) -> Result<AuthRequest> {
    let req: AuthRequest =
        serde_json::from_slice(body).map_err(|e| ServiceError::JsonParse(e.to_string()))?;
    req.validate()?;
    Ok(req)
}

/// 构造带认证 Cookie 的 200 响应
fn authenticated_response(state: &AppState, login: &str) -> Response {
    let mut response = StatusCode::OK.into_response();

    match HeaderValue::from_str(&state.cookies.build_set_cookie(login)) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        // 登录名含不可见字符等导致头非法：登录仍成功，但客户端拿不到 Cookie
        Err(e) => warn!(login = %login, error = %e, "认证 Cookie 写入失败"),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_request_errors() {
        let err = parse_auth_request(b"not json").unwrap_err();
        assert!(matches!(err, ServiceError::JsonParse(_)));

        let err = parse_auth_request(br#"{"login":"","password":"p"}"#).unwrap_err();
        assert!(matches!(err, ServiceError::RequestInvalid(_)));

        let req = parse_auth_request(br#"{"login":"alice","password":"p"}"#).unwrap();
        assert_eq!(req.login, "alice");
    }
}
