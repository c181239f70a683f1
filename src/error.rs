//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{jwt::TokenError, password::PasswordError};
use crate::repository::RepoError;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No Authorization header provided")]
    MissingAuthorization,

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Access denied")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingAuthorization | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingAuthorization => "No Authorization header provided".to_string(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::BadRequest(msg) => {
                msg.clone()
            }
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub msg: String,
    pub code: u16,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            msg: self.user_message(),
            code: self.code(),
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.request_id,
                "Application error"
            );
        } else {
            tracing::debug!(
                code = self.code(),
                message = %self,
                request_id = %error_response.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Encoding(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Mismatch => {
                AppError::Unauthorized("invalid identifier or secret".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            RepoError::Database(e) => AppError::Database(e),
            RepoError::Migration(msg) => AppError::Internal(msg),
        }
    }
}

/// JSON 请求体解析失败统一映射为 400
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(format!("invalid json: {}", rejection.body_text()))
    }
}

/// 路径参数解析失败同样返回 400
impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        AppError::BadRequest(format!("invalid path parameter: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::MissingAuthorization.code(), 403);
        assert_eq!(AppError::Unauthorized("x".to_string()).code(), 401);
        assert_eq!(AppError::Forbidden.code(), 403);
        assert_eq!(AppError::NotFound("x".to_string()).code(), 404);
        assert_eq!(AppError::Conflict("x".to_string()).code(), 409);
        assert_eq!(AppError::BadRequest("test".to_string()).code(), 400);
        assert_eq!(AppError::Internal("boom".to_string()).code(), 500);
    }

    #[test]
    fn test_user_message_no_sensitive_info() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        let message = error.user_message();
        assert_eq!(message, "Database error occurred");
        assert!(!message.contains("sqlx"));

        let error = AppError::Internal("bcrypt: invalid cost".to_string());
        assert_eq!(error.user_message(), "Internal server error");
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        let error: AppError = TokenError::Expired.into();
        assert_eq!(error.code(), 401);
        assert_eq!(error.user_message(), TokenError::Expired.to_string());

        let error: AppError = TokenError::InvalidSignature.into();
        assert_eq!(error.code(), 401);

        let error: AppError = TokenError::Encoding("bad key".to_string()).into();
        assert_eq!(error.code(), 500);
    }

    #[test]
    fn test_password_errors_mapping() {
        let error: AppError = PasswordError::Mismatch.into();
        assert_eq!(error.code(), 401);

        let error: AppError = PasswordError::Hashing("entropy".to_string()).into();
        assert_eq!(error.code(), 500);
    }

    #[test]
    fn test_repo_conflict_maps_to_409() {
        let error: AppError = RepoError::Conflict("account already exists".to_string()).into();
        assert_eq!(error.code(), 409);
        assert_eq!(error.user_message(), "account already exists");

        let error: AppError = RepoError::NotFound("employee").into();
        assert_eq!(error.code(), 404);
        assert_eq!(error.user_message(), "employee not found");
    }
}
