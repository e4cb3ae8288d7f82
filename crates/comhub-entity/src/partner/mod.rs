//! Partner (sponsor) entities.

pub mod model;
pub mod tier;

pub use model::{CreatePartner, Partner, UpdatePartner};
pub use tier::PartnerTier;
