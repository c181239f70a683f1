//! 健康检查处理器
//! 提供 /health 和 /ready 端点

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::middleware::AppState;

/// 存活探针响应
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 记录应用启动时间，重复调用无效
pub fn set_start_time() {
    APP_START_TIME.get_or_init(Instant::now);
}

/// 应用运行时间（秒），未设置时为 0
pub fn get_uptime() -> u64 {
    APP_START_TIME.get().map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: get_uptime(),
    })
}

/// 就绪探针
/// 数据存储不可用时返回 503
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = match state.schema.ping().await {
        Ok(()) => HealthCheck {
            name: "database".to_string(),
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            HealthCheck {
                name: "database".to_string(),
                status: "unhealthy".to_string(),
                message: Some(e.to_string()),
            }
        }
    };

    let checks = vec![store];
    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
