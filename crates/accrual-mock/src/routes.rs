//! Mock 服务路由与处理器

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::MemoryStore;

/// 外部协议中的订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

/// 单个订单的判定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub order: String,
    pub status: VerdictStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub accrual: Option<Decimal>,
}

/// 限流预设请求
#[derive(Debug, Deserialize)]
pub struct ThrottleRequest {
    /// 接下来多少次查询返回 429
    pub count: u32,
    /// 429 响应携带的 Retry-After 秒数
    pub retry_after: u64,
}

/// Mock 服务状态
#[derive(Clone)]
pub struct MockState {
    verdicts: MemoryStore<Verdict>,
    /// 剩余的 429 次数
    throttle_remaining: Arc<AtomicU32>,
    /// Retry-After 秒数（仅在限流期间有意义）
    retry_after: Arc<AtomicU32>,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            verdicts: MemoryStore::new(),
            throttle_remaining: Arc::new(AtomicU32::new(0)),
            retry_after: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

/// 构建 Mock 服务路由
pub fn mock_routes(state: MockState) -> Router {
    Router::new()
        .route("/api/orders/{number}", get(get_order_verdict))
        .route("/api/orders", post(seed_verdict))
        .route("/api/throttle", post(arm_throttle))
        .with_state(state)
}

/// 查询订单判定
///
/// GET /api/orders/:number；限流计数未耗尽时返回 429
async fn get_order_verdict(
    State(state): State<MockState>,
    Path(number): Path<String>,
) -> Response {
    // fetch_update：并发下保证恰好 count 次 429
    let throttled = state
        .throttle_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();

    if throttled {
        let seconds = state.retry_after.load(Ordering::SeqCst);
        info!(number = %number, retry_after = seconds, "限流中，返回 429");

        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    match state.verdicts.get(&number) {
        Some(verdict) => {
            info!(number = %number, status = ?verdict.status, "返回订单判定");
            Json(verdict).into_response()
        }
        None => {
            info!(number = %number, "订单未注册");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// 预设一条订单判定
///
/// POST /api/orders
async fn seed_verdict(
    State(state): State<MockState>,
    Json(verdict): Json<Verdict>,
) -> StatusCode {
    info!(number = %verdict.order, status = ?verdict.status, "预设订单判定");
    let key = verdict.order.clone();
    state.verdicts.insert(&key, verdict);
    StatusCode::OK
}

/// 预设限流
///
/// POST /api/throttle
async fn arm_throttle(
    State(state): State<MockState>,
    Json(req): Json<ThrottleRequest>,
) -> StatusCode {
    info!(count = req.count, retry_after = req.retry_after, "预设限流");
    state.retry_after.store(req.retry_after as u32, Ordering::SeqCst);
    state.throttle_remaining.store(req.count, Ordering::SeqCst);
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_app() -> (Router, MockState) {
        let state = MockState::new();
        (mock_routes(state.clone()), state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_order_returns_204() {
        let (app, _) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/orders/12345678903")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_seed_then_get_verdict() {
        let (app, state) = create_test_app();

        let seed = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"order":"12345678903","status":"PROCESSED","accrual":500}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(seed.status(), StatusCode::OK);
        assert_eq!(state.verdicts.len(), 1);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/orders/12345678903")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["order"], serde_json::json!("12345678903"));
        assert_eq!(body["status"], serde_json::json!("PROCESSED"));
        // 积分额是不带引号的数字
        assert_eq!(body["accrual"], serde_json::json!(500.0));
    }

    #[tokio::test]
    async fn test_throttle_answers_429_then_recovers() {
        let (app, _) = create_test_app();

        let arm = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/throttle")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"count":1,"retry_after":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(arm.status(), StatusCode::OK);

        // 第一次：429 + Retry-After
        let first = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/orders/2377225624")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            first.headers().get(header::RETRY_AFTER).unwrap(),
            &HeaderValue::from_static("2")
        );

        // 第二次：限流耗尽，回到正常语义
        let second = app
            .oneshot(
                Request::builder()
                    .uri("/api/orders/2377225624")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_verdict_without_accrual_omits_field() {
        let (app, state) = create_test_app();
        state.verdicts.insert(
            "2377225624",
            Verdict {
                order: "2377225624".to_string(),
                status: VerdictStatus::Invalid,
                accrual: None,
            },
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/orders/2377225624")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], serde_json::json!("INVALID"));
        assert!(body.get("accrual").is_none());
    }
}
