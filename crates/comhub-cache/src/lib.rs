//! # comhub-cache
//!
//! Cache provider implementations for ComHub and the advisory
//! [`DistributedLock`] built on top of them. Two backends:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka),
//!   for single-node deployments and tests
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
pub mod lock;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use lock::{DistributedLock, LockGuard};
pub use provider::CacheManager;
