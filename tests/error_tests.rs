//! 错误处理单元测试
//!
//! 测试应用错误类型的各种行为

use axum::{http::StatusCode, response::IntoResponse};
use authgate::error::AppError;
use http_body_util::BodyExt;

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        AppError::Config("bad".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal("boom".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// ==================== 用户消息测试 ====================

#[test]
fn test_user_messages_no_sensitive_info() {
    let error = AppError::Internal("token endpoint returned invalid_client".to_string());
    let message = error.user_message();
    assert_eq!(message, "Internal server error");
    assert!(!message.contains("invalid_client"));
}

// ==================== 响应格式测试 ====================

#[tokio::test]
async fn test_unauthorized_response_body() {
    let response = AppError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["error"]["code"], 401);
    assert_eq!(json["error"]["message"], "Authentication failed");
    assert!(!json["error"]["request_id"].as_str().unwrap().is_empty());
}

#[test]
fn test_config_error_conversion() {
    let error: AppError = config::ConfigError::Message("missing".to_string()).into();
    assert!(matches!(error, AppError::Config(_)));
    assert_eq!(error.code(), 500);
}
