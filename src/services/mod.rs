//! Business logic services layer

pub mod entitlement_service;

pub use entitlement_service::EntitlementService;
