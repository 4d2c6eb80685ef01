//! HTTP 处理器模块

pub mod entitlement;
pub mod health;
