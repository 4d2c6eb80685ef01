//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let collection = state.config.entitlements_path();
    let item = format!("{}/{{id}}", collection);
    let body_limit = state.config.server.max_body_bytes;

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 授权记录（集合路径带或不带结尾斜杠都可访问）
    let entitlement_routes = Router::new()
        .route(
            &collection,
            get(handlers::entitlement::list_entitlements)
                .post(handlers::entitlement::create_entitlement),
        )
        .route(
            &format!("{}/", collection),
            get(handlers::entitlement::list_entitlements)
                .post(handlers::entitlement::create_entitlement),
        )
        .route(
            &item,
            get(handlers::entitlement::get_entitlement)
                .put(handlers::entitlement::update_entitlement)
                .patch(handlers::entitlement::update_entitlement)
                .delete(handlers::entitlement::delete_entitlement),
        );

    Router::new()
        .merge(public_routes)
        .merge(entitlement_routes)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
