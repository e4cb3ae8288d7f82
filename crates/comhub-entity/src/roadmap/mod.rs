//! Learning roadmap entities.

pub mod model;

pub use model::{CreateRoadmap, NewRoadmapStep, Roadmap, RoadmapStep, RoadmapWithSteps, UpdateRoadmap};
