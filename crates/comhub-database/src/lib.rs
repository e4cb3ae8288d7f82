//! # comhub-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all ComHub entities, including the Postgres-backed
//! refresh token store and grant source used by `comhub-auth`.

pub mod connection;
pub mod migration;
pub mod query;
pub mod repositories;

pub use connection::DatabasePool;
