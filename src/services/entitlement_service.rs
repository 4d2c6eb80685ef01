//! 授权记录服务
//! 在请求与存储之间做校验与结果组装

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    models::entitlement::*,
    repository::EntitlementStore,
};

const NOT_FOUND_MESSAGE: &str = "Entitlement not found";

pub struct EntitlementService {
    store: Arc<dyn EntitlementStore>,
}

impl EntitlementService {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EntitlementStore> {
        &self.store
    }

    /// 创建授权记录
    /// user_id、resource_type、resource_id 缺失或为空时直接拒绝，不访问存储
    pub async fn create_entitlement(&self, req: CreateEntitlementRequest) -> Result<Entitlement> {
        req.validate()
            .map_err(|_| AppError::validation(REQUIRED_FIELDS_MESSAGE))?;

        let (Some(user_id), Some(resource_type), Some(resource_id)) =
            (req.user_id, req.resource_type, req.resource_id)
        else {
            return Err(AppError::validation(REQUIRED_FIELDS_MESSAGE));
        };

        let new = NewEntitlement {
            user_id,
            resource_type,
            resource_id,
            access_level: req.access_level,
            is_active: req.is_active.unwrap_or(true),
            description: req.description,
            granted_by: req.granted_by,
            expires_at: req.expires_at,
        };

        let entitlement = self.store.create(new).await?;

        metrics::counter!("entitlements_created_total").increment(1);
        tracing::info!(
            entitlement_id = %entitlement.id,
            user_id = %entitlement.user_id,
            resource_type = %entitlement.resource_type,
            resource_id = %entitlement.resource_id,
            "Entitlement created"
        );

        Ok(entitlement)
    }

    /// 获取单条授权记录
    pub async fn read_entitlement(&self, id: Uuid) -> Result<Entitlement> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))
    }

    /// 分页列出授权记录
    /// list 与 count 使用同一组过滤条件，两次读取之间不保证快照一致
    pub async fn list_entitlements(
        &self,
        filters: &EntitlementFilters,
        skip: u64,
        limit: u64,
    ) -> Result<EntitlementList> {
        let items = self.store.list(filters, skip, limit).await?;
        let total = self.store.count(filters).await?;

        tracing::debug!(
            skip,
            limit,
            returned = items.len(),
            total,
            "Entitlements listed"
        );

        Ok(EntitlementList { items, total })
    }

    /// 部分更新授权记录（不做字段校验）
    pub async fn update_entitlement(
        &self,
        id: Uuid,
        changes: &UpdateEntitlementRequest,
    ) -> Result<Entitlement> {
        let entitlement = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

        metrics::counter!("entitlements_updated_total").increment(1);
        tracing::info!(
            entitlement_id = %id,
            fields = ?changes.touched_fields(),
            "Entitlement updated"
        );

        Ok(entitlement)
    }

    /// 删除授权记录，返回删除前的状态
    pub async fn delete_entitlement(&self, id: Uuid) -> Result<Entitlement> {
        let entitlement = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND_MESSAGE))?;

        metrics::counter!("entitlements_deleted_total").increment(1);
        tracing::info!(entitlement_id = %id, "Entitlement deleted");

        Ok(entitlement)
    }
}
