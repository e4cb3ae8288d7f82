//! Mentor entities.

pub mod model;

pub use model::{CreateMentor, Mentor, UpdateMentor};
