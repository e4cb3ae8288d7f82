//! Mentors, partners and learning roadmaps.

pub mod mentor;
pub mod partner;
pub mod roadmap;

pub use mentor::{CreateMentorRequest, MentorService, UpdateMentorRequest};
pub use partner::{CreatePartnerRequest, PartnerService, UpdatePartnerRequest};
pub use roadmap::{CreateRoadmapRequest, RoadmapService, RoadmapStepRequest, UpdateRoadmapRequest};
