//! 积分服务错误类型定义
//!
//! 校验与业务错误在 HTTP 边界被翻译为 4xx；完整性错误（理论上不应发生）
//! 与瞬态数据库错误记录日志后以 500 返回，轮询器对后者在下一轮重试。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// 积分服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // 校验错误
    #[error("订单号格式不正确")]
    OrderFormatInvalid,
    #[error("请求不合法: {0}")]
    RequestInvalid(String),
    #[error("请求体不是合法 JSON: {0}")]
    JsonParse(String),

    // 认证错误
    #[error("登录名或密码错误")]
    WrongCredentials,
    #[error("用户未认证")]
    NotAuthenticated,
    #[error("登录名已被占用")]
    LoginTaken,

    // 业务错误
    #[error("余额不足")]
    InsufficientFunds,
    #[error("订单已由当前用户上传")]
    OrderAlreadyUploaded,
    #[error("订单已由其他用户上传")]
    OrderOwnedByAnotherUser,
    #[error("订单 {0} 既无法创建也无法查到")]
    OrderCreateFailed(i64),

    // 完整性错误（不应发生，引用完整性由上传流程保证）
    #[error("用户不存在: id={0}")]
    NoSuchUser(i32),
    #[error("订单不存在: number={0}")]
    NoSuchOrder(i64),

    // 系统错误
    #[error("密码哈希失败: {0}")]
    PasswordHash(String),
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::OrderFormatInvalid => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RequestInvalid(_) | Self::JsonParse(_) => StatusCode::BAD_REQUEST,

            Self::WrongCredentials | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::LoginTaken | Self::OrderOwnedByAnotherUser => StatusCode::CONFLICT,

            Self::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            // 同一用户重复上传同一订单按成功处理
            Self::OrderAlreadyUploaded => StatusCode::OK,

            Self::OrderCreateFailed(_)
            | Self::NoSuchUser(_)
            | Self::NoSuchOrder(_)
            | Self::PasswordHash(_)
            | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OrderFormatInvalid => "ORDER_FORMAT_INVALID",
            Self::RequestInvalid(_) => "REQUEST_INVALID",
            Self::JsonParse(_) => "JSON_PARSE_ERROR",
            Self::WrongCredentials => "WRONG_CREDENTIALS",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::LoginTaken => "LOGIN_TAKEN",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::OrderAlreadyUploaded => "ORDER_ALREADY_UPLOADED",
            Self::OrderOwnedByAnotherUser => "ORDER_OWNED_BY_ANOTHER_USER",
            Self::OrderCreateFailed(_) => "ORDER_CREATE_FAILED",
            Self::NoSuchUser(_) => "NO_SUCH_USER",
            Self::NoSuchOrder(_) => "NO_SUCH_ORDER",
            Self::PasswordHash(_) => "PASSWORD_HASH_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::RequestInvalid(errors.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::PasswordHash(e) => {
                tracing::error!(error = %e, "密码哈希失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::NoSuchUser(id) => {
                tracing::error!(user_id = id, "引用完整性被破坏：用户不存在");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::NoSuchOrder(number) => {
                tracing::error!(order_number = number, "引用完整性被破坏：订单不存在");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造所有错误变体及其期望的 (StatusCode, error_code) 映射。
    /// 使用表驱动方式避免逐个变体写重复断言，新增变体时只需在一处维护。
    fn all_error_variants() -> Vec<(ServiceError, StatusCode, &'static str)> {
        vec![
            (ServiceError::OrderFormatInvalid, StatusCode::UNPROCESSABLE_ENTITY, "ORDER_FORMAT_INVALID"),
            (ServiceError::RequestInvalid("sum".into()), StatusCode::BAD_REQUEST, "REQUEST_INVALID"),
            (ServiceError::JsonParse("eof".into()), StatusCode::BAD_REQUEST, "JSON_PARSE_ERROR"),
            (ServiceError::WrongCredentials, StatusCode::UNAUTHORIZED, "WRONG_CREDENTIALS"),
            (ServiceError::NotAuthenticated, StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            (ServiceError::LoginTaken, StatusCode::CONFLICT, "LOGIN_TAKEN"),
            (ServiceError::InsufficientFunds, StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_FUNDS"),
            (ServiceError::OrderAlreadyUploaded, StatusCode::OK, "ORDER_ALREADY_UPLOADED"),
            (ServiceError::OrderOwnedByAnotherUser, StatusCode::CONFLICT, "ORDER_OWNED_BY_ANOTHER_USER"),
            (ServiceError::OrderCreateFailed(1), StatusCode::INTERNAL_SERVER_ERROR, "ORDER_CREATE_FAILED"),
            (ServiceError::NoSuchUser(7), StatusCode::INTERNAL_SERVER_ERROR, "NO_SUCH_USER"),
            (ServiceError::NoSuchOrder(42), StatusCode::INTERNAL_SERVER_ERROR, "NO_SUCH_ORDER"),
            (ServiceError::PasswordHash("params".into()), StatusCode::INTERNAL_SERVER_ERROR, "PASSWORD_HASH_ERROR"),
        ]
    }

    /// 状态码是 HTTP 契约的一部分，错误映射会直接导致客户端误判，逐一锁定。
    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "状态码不匹配: variant={label}"
            );
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(
                error.error_code(),
                expected_code,
                "错误码不匹配: expected={expected_code}"
            );
        }
    }

    #[test]
    fn test_from_sqlx_error() {
        let err = ServiceError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, ServiceError::Database(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    /// 系统级错误的响应消息不应泄露内部细节
    #[tokio::test]
    async fn test_database_error_hides_details() {
        let err = ServiceError::Database(sqlx::Error::PoolTimedOut);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("DATABASE_ERROR"));
        assert!(body["message"].as_str().unwrap().contains("服务内部错误"));
        assert!(body["data"].is_null());
    }

    /// 业务错误的响应消息保留原始描述
    #[tokio::test]
    async fn test_business_error_preserves_message() {
        let err = ServiceError::InsufficientFunds;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["message"], json!("余额不足"));
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        errors.add("login", ValidationError::new("length"));

        let err: ServiceError = errors.into();
        match &err {
            ServiceError::RequestInvalid(msg) => assert!(msg.contains("login")),
            other => panic!("期望 RequestInvalid，实际: {:?}", other),
        }
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
