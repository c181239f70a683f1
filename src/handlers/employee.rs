//! 员工管理的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::{
        employee::{CreateEmployeeRequest, UpdateEmployeeRequest},
        paging::PageQuery,
    },
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

/// 员工列表（含所属部门）
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let employees = state.directory_service.list_employees(query.into()).await?;
    Ok(Json(employees))
}

/// 按姓名查询
pub async fn search_employees(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let employees = state.directory_service.employees_by_name(&name).await?;
    Ok(Json(employees))
}

/// 最近若干天内入职的员工
pub async fn recent_employees(
    State(state): State<Arc<AppState>>,
    Path(days): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let employees = state
        .directory_service
        .employees_joined_within(&days, query.into())
        .await?;
    Ok(Json(employees))
}

/// 新建员工
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let employee = state.directory_service.create_employee(req).await?;
    Ok(Json(employee))
}

/// 修改员工姓名
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateEmployeeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let employee = state.directory_service.rename_employee(id, req).await?;
    Ok(Json(employee))
}

/// 删除员工
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    state.directory_service.delete_employee(id).await?;
    Ok(Json(json!({"message": "employee deleted"})))
}
