//! # comhub-entity
//!
//! Domain entity models for ComHub. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`; enums map onto PostgreSQL enum types.

pub mod audit;
pub mod event;
pub mod mentor;
pub mod partner;
pub mod rbac;
pub mod registration;
pub mod roadmap;
pub mod token;
pub mod user;
