//! 部门管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::{department::DepartmentRequest, paging::PageQuery},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 部门列表（含员工）
pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let departments = state.directory_service.list_departments(query.into()).await?;
    Ok(Json(departments))
}

/// 部门列表（不含员工）
pub async fn list_departments_only(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let departments = state.directory_service.list_departments_only(query.into()).await?;
    Ok(Json(departments))
}

/// 按名称查询部门
pub async fn get_department(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let department = state.directory_service.department_by_name(&name).await?;
    Ok(Json(department))
}

/// 部门下的员工
pub async fn list_department_employees(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let employees = state
        .directory_service
        .department_employees(&name, query.into())
        .await?;
    Ok(Json(employees))
}

/// 创建部门
pub async fn create_department(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DepartmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let department = state.directory_service.create_department(req).await?;
    Ok(Json(department))
}

/// 重命名部门
pub async fn update_department(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DepartmentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let department = state.directory_service.rename_department(id, req).await?;
    Ok(Json(department))
}

/// 删除部门
pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    state.directory_service.delete_department(id).await?;
    Ok(Json(json!({"message": "department deleted"})))
}
