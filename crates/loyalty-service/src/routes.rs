//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射，并组装认证中间件。

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// 构建用户侧 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/register", post(handlers::auth::register))
        .route("/api/user/login", post(handlers::auth::login))
        .route(
            "/api/user/orders",
            post(handlers::orders::upload_order).get(handlers::orders::list_orders),
        )
        .route("/api/user/balance", get(handlers::balance::get_balance))
        .route(
            "/api/user/balance/withdraw",
            post(handlers::balance::withdraw),
        )
        .route(
            "/api/user/balance/withdrawals",
            get(handlers::balance::list_withdrawals),
        )
}

/// 组装完整应用：API 路由 + 健康检查 + 认证中间件
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .route("/health", get(health_check))
        // 认证中间件：验证签名 Cookie 并注入当前用户
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "loyalty-service"
    }))
}
