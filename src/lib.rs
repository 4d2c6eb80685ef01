//! 授权记录服务库
//! 记录外部用户对资源的访问级别，并提供增删改查与过滤分页

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
