//! 健康检查处理器
//! 提供 /、/health 和 /ready 端点

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

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

/// 根路径欢迎信息
pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to {}", state.config.api.app_name)
    }))
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// 就绪探针
/// 检查存储后端
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let storage = match state.entitlement_service.store().ping().await {
        Ok(()) => HealthCheck {
            name: "storage".to_string(),
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            HealthCheck {
                name: "storage".to_string(),
                status: "unhealthy".to_string(),
                message: Some(e.to_string()),
            }
        }
    };

    let checks = vec![storage];
    let ready = checks.iter().all(|c| c.status == "healthy");
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}
