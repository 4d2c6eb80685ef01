//! 授权记录的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::entitlement::*,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub user_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub is_active: Option<bool>,
}

fn default_limit() -> i64 {
    100
}

impl ListQuery {
    /// 校验分页参数，返回 (skip, limit)
    fn page(&self) -> Result<(u64, u64), AppError> {
        let skip = u64::try_from(self.skip)
            .map_err(|_| AppError::bad_request("skip must be greater than or equal to 0"))?;

        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(AppError::bad_request(&format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok((skip, self.limit as u64))
    }

    /// 空字符串过滤条件视为未提供
    fn filters(&self) -> EntitlementFilters {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        EntitlementFilters {
            user_id: non_empty(&self.user_id),
            resource_type: non_empty(&self.resource_type),
            resource_id: non_empty(&self.resource_id),
            is_active: self.is_active,
        }
    }
}

/// 创建授权记录
pub async fn create_entitlement(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntitlementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entitlement = state.entitlement_service.create_entitlement(req).await?;

    Ok((StatusCode::CREATED, Json(entitlement)))
}

/// 列出授权记录
pub async fn list_entitlements(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EntitlementList>, AppError> {
    let (skip, limit) = query.page()?;
    let filters = query.filters();

    let list = state
        .entitlement_service
        .list_entitlements(&filters, skip, limit)
        .await?;

    Ok(Json(list))
}

/// 获取授权记录详情
pub async fn get_entitlement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Entitlement>, AppError> {
    let entitlement = state.entitlement_service.read_entitlement(id).await?;

    Ok(Json(entitlement))
}

/// 更新授权记录
pub async fn update_entitlement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEntitlementRequest>,
) -> Result<Json<Entitlement>, AppError> {
    let entitlement = state
        .entitlement_service
        .update_entitlement(id, &req)
        .await?;

    Ok(Json(entitlement))
}

/// 删除授权记录
pub async fn delete_entitlement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Entitlement>, AppError> {
    let entitlement = state.entitlement_service.delete_entitlement(id).await?;

    Ok(Json(entitlement))
}
