//! Entitlement storage layer
//!
//! [`EntitlementStore`] is the only capability the service layer needs from
//! persistence. Two backends implement it: Postgres via `sqlx` and an
//! in-memory store used for development and tests.

pub mod entitlement_repo;
pub mod memory;

pub use entitlement_repo::EntitlementRepository;
pub use memory::MemoryEntitlementStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::entitlement::{
    Entitlement, EntitlementFilters, NewEntitlement, UpdateEntitlementRequest,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage failures, passed to callers as-is; stores never retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err)
                if matches!(db_err.code().as_deref(), Some("23502" | "23505" | "23514")) =>
            {
                StoreError::ConstraintViolation(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Primitive access to entitlement records.
///
/// `get`, `update` and `delete` signal a missing id with `Ok(None)`.
/// `list` and `count` share the same filter semantics, and `list` returns
/// records in insertion order.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    async fn create(&self, new: NewEntitlement) -> StoreResult<Entitlement>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Entitlement>>;

    /// Applies only the keys present in `changes` and stamps `updated_at`.
    async fn update(
        &self,
        id: Uuid,
        changes: &UpdateEntitlementRequest,
    ) -> StoreResult<Option<Entitlement>>;

    /// Removes the record and returns it as it was just before removal.
    async fn delete(&self, id: Uuid) -> StoreResult<Option<Entitlement>>;

    async fn list(
        &self,
        filters: &EntitlementFilters,
        skip: u64,
        limit: u64,
    ) -> StoreResult<Vec<Entitlement>>;

    async fn count(&self, filters: &EntitlementFilters) -> StoreResult<u64>;

    /// Readiness probe.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
