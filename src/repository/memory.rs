//! In-memory storage backend for testing and development

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntitlementStore, StoreError, StoreResult};
use crate::models::entitlement::{
    Entitlement, EntitlementFilters, NewEntitlement, UpdateEntitlementRequest,
};

/// In-memory entitlement store; mirrors the `NOT NULL` columns of the
/// Postgres schema so both backends reject the same updates.
#[derive(Clone, Default)]
pub struct MemoryEntitlementStore {
    data: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    /// Records keyed by insertion sequence
    records: BTreeMap<u64, Entitlement>,
    /// id -> sequence
    index: HashMap<Uuid, u64>,
    next_seq: u64,
}

impl MemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, ignoring filters.
    pub async fn len(&self) -> usize {
        self.data.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EntitlementStore for MemoryEntitlementStore {
    async fn create(&self, new: NewEntitlement) -> StoreResult<Entitlement> {
        let mut state = self.data.write().await;

        let mut id = Uuid::new_v4();
        while state.index.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let entitlement = Entitlement {
            id,
            user_id: new.user_id,
            resource_type: new.resource_type,
            resource_id: new.resource_id,
            access_level: new.access_level,
            is_active: new.is_active,
            description: new.description,
            granted_by: new.granted_by,
            expires_at: new.expires_at,
            created_at: Utc::now(),
            updated_at: None,
        };

        let seq = state.next_seq;
        state.next_seq += 1;
        state.index.insert(id, seq);
        state.records.insert(seq, entitlement.clone());

        Ok(entitlement)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Entitlement>> {
        let state = self.data.read().await;

        Ok(state
            .index
            .get(&id)
            .and_then(|seq| state.records.get(seq))
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateEntitlementRequest,
    ) -> StoreResult<Option<Entitlement>> {
        let mut state = self.data.write().await;

        let Some(seq) = state.index.get(&id).copied() else {
            return Ok(None);
        };
        let Some(current) = state.records.get(&seq) else {
            return Ok(None);
        };

        // 先在副本上应用，失败时原记录保持不变
        let mut updated = current.clone();
        changes.apply_to(&mut updated).map_err(|column| {
            StoreError::ConstraintViolation(format!("null value in column \"{column}\""))
        })?;

        // updated_at 单调不减
        let floor = current.updated_at.unwrap_or(current.created_at);
        updated.updated_at = Some(Utc::now().max(floor));

        state.records.insert(seq, updated.clone());

        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Entitlement>> {
        let mut state = self.data.write().await;

        let removed = state
            .index
            .remove(&id)
            .and_then(|seq| state.records.remove(&seq));

        Ok(removed)
    }

    async fn list(
        &self,
        filters: &EntitlementFilters,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Entitlement>> {
        let state = self.data.read().await;

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(state
            .records
            .values()
            .filter(|e| filters.matches(e))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filters: &EntitlementFilters) -> StoreResult<u64> {
        let state = self.data.read().await;

        let count = state.records.values().filter(|e| filters.matches(e)).count();

        Ok(count as u64)
    }
}
