//! Community event entities.

pub mod model;
pub mod status;

pub use model::{CreateEvent, Event, UpdateEvent};
pub use status::EventStatus;
