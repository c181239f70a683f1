//! 表结构管理

use crate::{auth::Identity, error::AppError, middleware::AppState};
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// 建表
pub async fn init_tables(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    state.schema.init().await?;
    tracing::info!(subject = %identity.subject, "Tables initialised");
    Ok(Json(json!({"message": "tables created"})))
}

/// 删除所有表
pub async fn drop_tables(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<impl IntoResponse, AppError> {
    state.schema.drop_all().await?;
    tracing::warn!(subject = %identity.subject, "Tables dropped");
    Ok(Json(json!({"message": "tables dropped"})))
}
