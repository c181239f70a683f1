//! 令牌认证中间件
//! 校验 Authorization 头并把身份注入请求扩展

use crate::{auth::jwt::TokenCodec, error::AppError, models::account::AuthMethod};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// 认证身份（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// 令牌中的 subject（账户标识或邮箱）
    pub subject: String,
    /// 签发令牌时的认证方式
    pub method: AuthMethod,
    pub issued_at: i64,
    pub expires_at: i64,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 Identity
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // 路由未挂载网关时不会有身份
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no authenticated identity".to_string()))
    }
}

/// 从 Authorization 头提取令牌
///
/// 头缺失或为空返回 403；不是 `Bearer <token>` 形式返回 400。
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = match headers.get(AUTHORIZATION) {
        None => return Err(AppError::MissingAuthorization),
        Some(v) if v.is_empty() => return Err(AppError::MissingAuthorization),
        Some(v) => v,
    };

    let value = value.to_str().map_err(|_| incorrect_format())?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.contains(BEARER_PREFIX))
        .ok_or_else(incorrect_format)?;

    Ok(token.to_string())
}

fn incorrect_format() -> AppError {
    AppError::BadRequest("Incorrect Format of Authorization Token".to_string())
}

/// 认证网关中间件 - 必须认证
pub async fn auth_gateway(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers()).map_err(|e| {
        tracing::debug!(reason = %e, uri = %req.uri(), "Authorization header rejected");
        e
    })?;

    let (claims, method) = codec
        .parse_and_verify(&token)
        .and_then(|claims| claims.auth_method().map(|method| (claims, method)))
        .map_err(|e| {
            tracing::warn!(reason = %e, uri = %req.uri(), "Session token rejected");
            AppError::from(e)
        })?;

    req.extensions_mut().insert(Identity {
        subject: claims.sub,
        method,
        issued_at: claims.iat,
        expires_at: claims.exp,
    });

    Ok(next.run(req).await)
}
