//! Entitlement domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Message returned whenever a create request lacks one of the identifying fields.
pub const REQUIRED_FIELDS_MESSAGE: &str = "user_id, resource_type, and resource_id are required";

/// A grant linking an external user to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entitlement {
    pub id: Uuid,
    pub user_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub access_level: Option<String>,
    pub is_active: bool,
    pub description: Option<String>,
    pub granted_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create entitlement request
///
/// The identifying fields are optional at the serde level so that a missing
/// field reaches validation instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateEntitlementRequest {
    #[validate(required(message = "user_id is required"), length(min = 1))]
    pub user_id: Option<String>,
    #[validate(required(message = "resource_type is required"), length(min = 1))]
    pub resource_type: Option<String>,
    #[validate(required(message = "resource_id is required"), length(min = 1))]
    pub resource_id: Option<String>,
    pub access_level: Option<String>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub granted_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Fields handed to the store once a create request has passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntitlement {
    pub user_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub access_level: Option<String>,
    pub is_active: bool,
    pub description: Option<String>,
    pub granted_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewEntitlement {
    pub fn new(
        user_id: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            access_level: None,
            is_active: true,
            description: None,
            granted_by: None,
            expires_at: None,
        }
    }
}

/// Update entitlement request
///
/// Every field is tri-state: `None` = absent (keep), `Some(None)` = explicit
/// null (clear), `Some(Some(v))` = set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateEntitlementRequest {
    #[serde(default, deserialize_with = "present")]
    pub user_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub resource_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub resource_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub access_level: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub is_active: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub granted_by: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Marks a key as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateEntitlementRequest {
    /// Names of the columns this request touches, in a fixed order.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.user_id.is_some() {
            fields.push("user_id");
        }
        if self.resource_type.is_some() {
            fields.push("resource_type");
        }
        if self.resource_id.is_some() {
            fields.push("resource_id");
        }
        if self.access_level.is_some() {
            fields.push("access_level");
        }
        if self.is_active.is_some() {
            fields.push("is_active");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.granted_by.is_some() {
            fields.push("granted_by");
        }
        if self.expires_at.is_some() {
            fields.push("expires_at");
        }
        fields
    }

    /// Applies the present keys to `target`.
    ///
    /// Returns the name of the first non-nullable column the request tries to
    /// null out; `target` is left unchanged in that case.
    pub fn apply_to(&self, target: &mut Entitlement) -> Result<(), &'static str> {
        if matches!(self.user_id, Some(None)) {
            return Err("user_id");
        }
        if matches!(self.resource_type, Some(None)) {
            return Err("resource_type");
        }
        if matches!(self.resource_id, Some(None)) {
            return Err("resource_id");
        }
        if matches!(self.is_active, Some(None)) {
            return Err("is_active");
        }

        if let Some(Some(user_id)) = &self.user_id {
            target.user_id = user_id.clone();
        }
        if let Some(Some(resource_type)) = &self.resource_type {
            target.resource_type = resource_type.clone();
        }
        if let Some(Some(resource_id)) = &self.resource_id {
            target.resource_id = resource_id.clone();
        }
        if let Some(access_level) = &self.access_level {
            target.access_level = access_level.clone();
        }
        if let Some(Some(is_active)) = self.is_active {
            target.is_active = is_active;
        }
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
        if let Some(granted_by) = &self.granted_by {
            target.granted_by = granted_by.clone();
        }
        if let Some(expires_at) = self.expires_at {
            target.expires_at = expires_at;
        }
        Ok(())
    }
}

/// Conjunction of exact-match predicates; absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntitlementFilters {
    pub user_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub is_active: Option<bool>,
}

impl EntitlementFilters {
    pub fn matches(&self, entitlement: &Entitlement) -> bool {
        self.user_id.as_ref().map_or(true, |v| *v == entitlement.user_id)
            && self.resource_type.as_ref().map_or(true, |v| *v == entitlement.resource_type)
            && self.resource_id.as_ref().map_or(true, |v| *v == entitlement.resource_id)
            && self.is_active.map_or(true, |v| v == entitlement.is_active)
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitlementList {
    pub items: Vec<Entitlement>,
    pub total: u64,
}
