//! Cookie 认证中间件
//!
//! 验证请求中的签名 Cookie，按登录名加载用户并注入请求扩展。
//! 公开路由（注册、登录、健康检查）跳过验证。

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ServiceError;
use crate::models::User;
use crate::state::AppState;

/// 注入请求扩展的当前用户
///
/// 由中间件在每个请求上从数据库加载，余额等字段始终是最新值。
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// 认证中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    // 公开路由列表（不需要认证）
    let public_paths = ["/api/user/register", "/api/user/login", "/health"];
    if public_paths.contains(&path) {
        return next.run(request).await;
    }

    let login = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| state.cookies.login_from_cookie_header(h));

    let Some(login) = login else {
        debug!(path, "请求未携带有效的认证 Cookie");
        return ServiceError::NotAuthenticated.into_response();
    };

    match state.users.get_by_login(&login).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(AuthUser(user));
            next.run(request).await
        }
        // Cookie 合法但用户不存在：当作未认证而非服务器错误
        Ok(None) => {
            debug!(login = %login, "Cookie 中的用户不存在");
            ServiceError::NotAuthenticated.into_response()
        }
        Err(e) => e.into_response(),
    }
}
