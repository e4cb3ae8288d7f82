//! Administrative handlers. Every route here sits behind `require_auth`
//! and each operation checks its own capability in the service layer.

pub mod audit;
pub mod events;
pub mod mentors;
pub mod partners;
pub mod registrations;
pub mod roadmaps;
pub mod roles;
pub mod users;
