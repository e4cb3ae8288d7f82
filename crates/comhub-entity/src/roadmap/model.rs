//! Roadmap and roadmap step entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A curated learning path.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Roadmap {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ordered step of a roadmap.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoadmapStep {
    pub id: Uuid,
    pub roadmap_id: Uuid,
    /// 1-based, unique within the roadmap.
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub resource_url: Option<String>,
}

/// A roadmap with its steps in position order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapWithSteps {
    #[serde(flatten)]
    pub roadmap: Roadmap,
    pub steps: Vec<RoadmapStep>,
}

#[derive(Debug, Clone)]
pub struct CreateRoadmap {
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRoadmap {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub is_published: Option<bool>,
}

/// Step content; positions are assigned from list order.
#[derive(Debug, Clone)]
pub struct NewRoadmapStep {
    pub title: String,
    pub description: Option<String>,
    pub resource_url: Option<String>,
}
