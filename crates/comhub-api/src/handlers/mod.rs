//! HTTP request handlers grouped by audience.

pub mod admin;
pub mod auth;
pub mod community;
pub mod events;
pub mod health;
