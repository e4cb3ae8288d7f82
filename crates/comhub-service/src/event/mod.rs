//! Events and their registrations.

pub mod registration;
pub mod service;

pub use registration::{RegisterRequest, RegistrationService};
pub use service::{CreateEventRequest, EventService, UpdateEventRequest};
