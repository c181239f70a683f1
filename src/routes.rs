//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{auth::auth_gateway, handlers, middleware::AppState};

/// 请求体上限 1 MiB
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/public/register", post(handlers::auth::register))
        .route("/api/public/login", post(handlers::auth::login));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route("/api/profile", get(handlers::auth::profile))
        .route(
            "/api/admin/schema",
            post(handlers::schema::init_tables).delete(handlers::schema::drop_tables),
        )
        // 部门；{key} 对 GET 是名称，对 PUT/DELETE 是 id
        .route(
            "/api/department",
            get(handlers::department::list_departments)
                .post(handlers::department::create_department),
        )
        .route("/api/department/only", get(handlers::department::list_departments_only))
        .route(
            "/api/department/{key}",
            get(handlers::department::get_department)
                .put(handlers::department::update_department)
                .delete(handlers::department::delete_department),
        )
        .route(
            "/api/department/{key}/employee",
            get(handlers::department::list_department_employees),
        )
        // 员工
        .route(
            "/api/employee",
            get(handlers::employee::list_employees).post(handlers::employee::create_employee),
        )
        .route("/api/employee/name/{name}", get(handlers::employee::search_employees))
        .route("/api/employee/day/{days}", get(handlers::employee::recent_employees))
        .route(
            "/api/employee/{id}",
            put(handlers::employee::update_employee)
                .delete(handlers::employee::delete_employee),
        )
        // 关联
        .route(
            "/api/assign/{employee_id}/{department_id}",
            post(handlers::assign::assign).delete(handlers::assign::unassign),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.token_codec.clone(),
            auth_gateway,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
