//! 员工与部门关联

use crate::{error::AppError, middleware::AppState};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 把员工加入部门；已存在的关联保持不变
pub async fn assign(
    State(state): State<Arc<AppState>>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((employee_id, department_id)) = ids?;
    state.directory_service.assign(employee_id, department_id).await?;
    Ok(Json(json!({"message": "employee assigned"})))
}

/// 把员工移出部门
pub async fn unassign(
    State(state): State<Arc<AppState>>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((employee_id, department_id)) = ids?;
    state.directory_service.unassign(employee_id, department_id).await?;
    Ok(Json(json!({"message": "employee unassigned"})))
}
