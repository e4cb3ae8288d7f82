//! Request DTOs with validation.
//!
//! Field-level rules live here; rules that need stored state or span
//! several fields are checked by the services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use comhub_entity::event::EventStatus;
use comhub_entity::partner::PartnerTier;
use comhub_service::community::{
    CreateMentorRequest, CreatePartnerRequest, CreateRoadmapRequest, RoadmapStepRequest,
};
use comhub_service::event::{CreateEventRequest, RegisterRequest};
use comhub_service::rbac::CreateRoleRequest;
use comhub_service::user::{CreateUserRequest, RoleGrantRequest};

// ── Auth ─────────────────────────────────────────────────────

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Body of refresh and logout requests.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

/// Password change request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub new_password: String,
}

// ── Users & roles ────────────────────────────────────────────

/// Create user request (admin).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 128, message = "must be at most 128 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
}

impl From<CreateUserDto> for CreateUserRequest {
    fn from(dto: CreateUserDto) -> Self {
        Self {
            email: dto.email,
            password: dto.password,
            display_name: dto.display_name,
            is_super_admin: dto.is_super_admin,
        }
    }
}

/// Full replacement of a user's roles.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplaceRolesRequest {
    #[validate(length(max = 32, message = "at most 32 roles"))]
    pub roles: Vec<RoleGrantDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleGrantDto {
    pub role_id: uuid::Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<RoleGrantDto> for RoleGrantRequest {
    fn from(dto: RoleGrantDto) -> Self {
        Self {
            role_id: dto.role_id,
            expires_at: dto.expires_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleDto {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl From<CreateRoleDto> for CreateRoleRequest {
    fn from(dto: CreateRoleDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            permissions: dto.permissions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPermissionsRequest {
    pub permissions: Vec<String>,
}

// ── Events ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventDto {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub slug: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 300, message = "must be at most 300 characters"))]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub requires_approval: bool,
}

impl From<CreateEventDto> for CreateEventRequest {
    fn from(dto: CreateEventDto) -> Self {
        Self {
            slug: dto.slug,
            title: dto.title,
            description: dto.description,
            location: dto.location,
            starts_at: dto.starts_at,
            ends_at: dto.ends_at,
            capacity: dto.capacity,
            requires_approval: dto.requires_approval,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: EventStatus,
}

/// Public registration form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterDto {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub full_name: String,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub note: Option<String>,
}

impl From<RegisterDto> for RegisterRequest {
    fn from(dto: RegisterDto) -> Self {
        Self {
            email: dto.email,
            full_name: dto.full_name,
            note: dto.note,
        }
    }
}

// ── Community ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMentorDto {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub full_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub headline: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20, message = "at most 20 entries"))]
    pub expertise: Vec<String>,
}

impl From<CreateMentorDto> for CreateMentorRequest {
    fn from(dto: CreateMentorDto) -> Self {
        Self {
            full_name: dto.full_name,
            email: dto.email,
            headline: dto.headline,
            bio: dto.bio,
            expertise: dto.expertise,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePartnerDto {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(url(message = "must be a valid URL"))]
    pub website: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub logo_url: Option<String>,
    pub tier: PartnerTier,
}

impl From<CreatePartnerDto> for CreatePartnerRequest {
    fn from(dto: CreatePartnerDto) -> Self {
        Self {
            name: dto.name,
            website: dto.website,
            logo_url: dto.logo_url,
            tier: dto.tier,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoadmapStepDto {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub resource_url: Option<String>,
}

impl From<RoadmapStepDto> for RoadmapStepRequest {
    fn from(dto: RoadmapStepDto) -> Self {
        Self {
            title: dto.title,
            description: dto.description,
            resource_url: dto.resource_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoadmapDto {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters"))]
    pub slug: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub title: String,
    pub summary: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub steps: Vec<RoadmapStepDto>,
}

impl From<CreateRoadmapDto> for CreateRoadmapRequest {
    fn from(dto: CreateRoadmapDto) -> Self {
        Self {
            slug: dto.slug,
            title: dto.title,
            summary: dto.summary,
            steps: dto.steps.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplaceStepsRequest {
    #[validate(nested)]
    pub steps: Vec<RoadmapStepDto>,
}

#[cfg(test)]
mod tests {
    use comhub_core::error::AppError;

    use super::*;

    #[test]
    fn test_login_problems_are_reported_together() {
        let req = LoginRequest {
            email: "not-an-email".into(),
            password: String::new(),
        };
        let err = AppError::from(req.validate().unwrap_err());
        let details = err.details.unwrap();
        assert_eq!(details["email"][0], "must be a valid email address");
        assert_eq!(details["password"][0], "is required");
    }

    #[test]
    fn test_nested_step_errors_are_indexed() {
        let req: CreateRoadmapDto = serde_json::from_value(serde_json::json!({
            "slug": "rust-basics",
            "title": "Rust basics",
            "steps": [
                {"title": "Install rustup"},
                {"title": "", "resource_url": "not a url"}
            ]
        }))
        .unwrap();
        let err = AppError::from(req.validate().unwrap_err());
        let details = err.details.unwrap();
        assert!(details["steps[1].title"].is_array());
        assert!(details["steps[1].resource_url"].is_array());
        assert!(details.get("steps[0].title").is_none());
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let req: CreateEventDto = serde_json::from_value(serde_json::json!({
            "slug": "meetup",
            "title": "Meetup",
            "starts_at": "2025-05-01T18:00:00Z",
            "ends_at": "2025-05-01T21:00:00Z",
            "capacity": 0
        }))
        .unwrap();
        let err = AppError::from(req.validate().unwrap_err());
        assert_eq!(err.details.unwrap()["capacity"][0], "must be greater than zero");
    }
}
