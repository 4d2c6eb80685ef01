//! Entitlement repository (Postgres 数据访问)

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{EntitlementStore, StoreResult};
use crate::models::entitlement::{
    Entitlement, EntitlementFilters, NewEntitlement, UpdateEntitlementRequest,
};

const RETURNING: &str = " RETURNING id, user_id, resource_type, resource_id, access_level, \
     is_active, description, granted_by, expires_at, created_at, updated_at";

const SELECT: &str = "SELECT id, user_id, resource_type, resource_id, access_level, \
     is_active, description, granted_by, expires_at, created_at, updated_at \
     FROM entitlements";

pub struct EntitlementRepository {
    db: PgPool,
}

impl EntitlementRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 追加过滤条件（全部为等值匹配，AND 连接）
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &EntitlementFilters) {
    if let Some(user_id) = &filters.user_id {
        builder.push(" AND user_id = ").push_bind(user_id.clone());
    }
    if let Some(resource_type) = &filters.resource_type {
        builder.push(" AND resource_type = ").push_bind(resource_type.clone());
    }
    if let Some(resource_id) = &filters.resource_id {
        builder.push(" AND resource_id = ").push_bind(resource_id.clone());
    }
    if let Some(is_active) = filters.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl EntitlementStore for EntitlementRepository {
    async fn create(&self, new: NewEntitlement) -> StoreResult<Entitlement> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO entitlements (id, user_id, resource_type, resource_id, access_level, \
             is_active, description, granted_by, expires_at) ",
        );
        builder.push_values(std::iter::once(new), |mut b, new| {
            b.push_bind(Uuid::new_v4())
                .push_bind(new.user_id)
                .push_bind(new.resource_type)
                .push_bind(new.resource_id)
                .push_bind(new.access_level)
                .push_bind(new.is_active)
                .push_bind(new.description)
                .push_bind(new.granted_by)
                .push_bind(new.expires_at);
        });
        builder.push(RETURNING);

        let entitlement = builder
            .build_query_as::<Entitlement>()
            .fetch_one(&self.db)
            .await?;

        tracing::debug!(entitlement_id = %entitlement.id, "Entitlement row inserted");

        Ok(entitlement)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Entitlement>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT);
        builder.push(" WHERE id = ").push_bind(id);

        let entitlement = builder
            .build_query_as::<Entitlement>()
            .fetch_optional(&self.db)
            .await?;

        Ok(entitlement)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateEntitlementRequest,
    ) -> StoreResult<Option<Entitlement>> {
        // 只更新请求中出现的字段；显式 null 会清空该列
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE entitlements SET updated_at = NOW()");

        if let Some(user_id) = &changes.user_id {
            builder.push(", user_id = ").push_bind(user_id.clone());
        }
        if let Some(resource_type) = &changes.resource_type {
            builder.push(", resource_type = ").push_bind(resource_type.clone());
        }
        if let Some(resource_id) = &changes.resource_id {
            builder.push(", resource_id = ").push_bind(resource_id.clone());
        }
        if let Some(access_level) = &changes.access_level {
            builder.push(", access_level = ").push_bind(access_level.clone());
        }
        if let Some(is_active) = changes.is_active {
            builder.push(", is_active = ").push_bind(is_active);
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(granted_by) = &changes.granted_by {
            builder.push(", granted_by = ").push_bind(granted_by.clone());
        }
        if let Some(expires_at) = changes.expires_at {
            builder.push(", expires_at = ").push_bind(expires_at);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(RETURNING);

        let entitlement = builder
            .build_query_as::<Entitlement>()
            .fetch_optional(&self.db)
            .await?;

        Ok(entitlement)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Entitlement>> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM entitlements WHERE id = ");
        builder.push_bind(id);
        builder.push(RETURNING);

        let entitlement = builder
            .build_query_as::<Entitlement>()
            .fetch_optional(&self.db)
            .await?;

        Ok(entitlement)
    }

    async fn list(
        &self,
        filters: &EntitlementFilters,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Entitlement>> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT);
        builder.push(" WHERE 1=1");
        push_filters(&mut builder, filters);
        builder
            .push(" ORDER BY seq ASC LIMIT ")
            .push_bind(to_i64(limit))
            .push(" OFFSET ")
            .push_bind(to_i64(skip));

        let entitlements = builder
            .build_query_as::<Entitlement>()
            .fetch_all(&self.db)
            .await?;

        Ok(entitlements)
    }

    async fn count(&self, filters: &EntitlementFilters) -> StoreResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM entitlements WHERE 1=1");
        push_filters(&mut builder, filters);

        let count: i64 = builder.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
