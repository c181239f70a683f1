//! 认证相关的 HTTP 处理器

use crate::{
    auth::Identity,
    error::AppError,
    middleware::AppState,
    models::auth::CredentialsRequest,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 注册本地账户
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let account = state.account_service.register(req).await?;
    Ok(Json(account))
}

/// 登录，成功返回会话令牌
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let response = state.account_service.login(req).await?;
    Ok(Json(response))
}

/// 当前令牌对应的账户
pub async fn profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    let account = state
        .account_service
        .profile(&identity.subject, identity.method)
        .await?;
    Ok(Json(account))
}
