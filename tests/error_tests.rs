//! 错误处理测试
//!
//! 测试应用错误类型的状态码与响应体

use axum::{http::StatusCode, response::IntoResponse};
use hr_admin::{
    auth::{PasswordError, TokenError},
    error::AppError,
    repository::RepoError,
};
use http_body_util::BodyExt;

async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::MissingAuthorization.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::Unauthorized("bad".to_string()).status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("resource".to_string()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Conflict("dup".to_string()).status_code(), StatusCode::CONFLICT);
    assert_eq!(
        AppError::BadRequest("invalid".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::Config("missing".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_database_error_status_code() {
    let app_error = AppError::Database(sqlx::Error::RowNotFound);
    assert_eq!(app_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ==================== 响应体测试 ====================

#[tokio::test]
async fn test_missing_authorization_body() {
    let (status, body) = body_of(AppError::MissingAuthorization).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "No Authorization header provided");
    assert_eq!(body["code"], 403);
    assert!(uuid::Uuid::parse_str(body["request_id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let (status, body) = body_of(AppError::Database(sqlx::Error::PoolTimedOut)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["msg"], "Database error occurred");

    let (_, body) = body_of(RepoError::Migration("relation exists".to_string()).into()).await;
    assert_eq!(body["msg"], "Internal server error");
}

#[tokio::test]
async fn test_token_error_message_reaches_client() {
    let (status, body) = body_of(TokenError::Expired.into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "token is expired");
}

#[tokio::test]
async fn test_credential_mismatch_message() {
    let (status, body) = body_of(PasswordError::Mismatch.into()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "invalid identifier or secret");
}

