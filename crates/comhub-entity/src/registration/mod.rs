//! Event registration entities.

pub mod model;
pub mod status;

pub use model::{CreateRegistration, Registration};
pub use status::RegistrationStatus;
