//! Route definitions for the ComHub HTTP API.
//!
//! All routes are organized by audience and mounted under `/api/v1`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use comhub_core::error::AppError;

use crate::error::ApiError;
use crate::handlers;
use crate::handlers::admin;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with every route, bound to `state`.
///
/// Cross-cutting layers are added by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(public_routes())
        .nest("/admin", admin_routes(state.clone()));

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(not_found)
        .with_state(state)
}

/// Liveness and readiness probes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::ready))
}

/// Auth endpoints: login, refresh, logout, me, password
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/password", put(handlers::auth::change_password))
}

/// Anonymous read access and event registration
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::events::list_events))
        .route("/events/{id}", get(handlers::events::get_event))
        .route("/events/{id}/registrations", post(handlers::events::register))
        .route("/mentors", get(handlers::community::list_mentors))
        .route("/partners", get(handlers::community::list_partners))
        .route("/roadmaps", get(handlers::community::list_roadmaps))
        .route("/roadmaps/{id}", get(handlers::community::get_roadmap))
}

/// Administration; every route requires a valid access token
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(admin::users::list_users).post(admin::users::create_user))
        .route(
            "/users/{id}",
            get(admin::users::get_user)
                .patch(admin::users::update_user)
                .delete(admin::users::delete_user),
        )
        .route("/users/{id}/deactivate", post(admin::users::deactivate_user))
        .route("/users/{id}/roles", put(admin::users::replace_roles))
        // Roles & permissions
        .route("/roles", get(admin::roles::list_roles).post(admin::roles::create_role))
        .route(
            "/roles/{id}",
            get(admin::roles::get_role)
                .patch(admin::roles::update_role)
                .delete(admin::roles::delete_role),
        )
        .route("/roles/{id}/permissions", put(admin::roles::set_permissions))
        .route("/permissions", get(admin::roles::list_permissions))
        // Audit
        .route("/audit", get(admin::audit::search_audit))
        // Events & registrations
        .route("/events", get(admin::events::list_events).post(admin::events::create_event))
        .route(
            "/events/{id}",
            get(admin::events::get_event)
                .patch(admin::events::update_event)
                .delete(admin::events::delete_event),
        )
        .route("/events/{id}/status", put(admin::events::change_status))
        .route(
            "/events/{id}/registrations",
            get(admin::registrations::list_for_event),
        )
        .route("/registrations/{id}", get(admin::registrations::get_registration))
        .route("/registrations/{id}/approve", post(admin::registrations::approve))
        .route("/registrations/{id}/reject", post(admin::registrations::reject))
        .route("/registrations/{id}/cancel", post(admin::registrations::cancel))
        // Mentors
        .route(
            "/mentors",
            get(admin::mentors::list_mentors).post(admin::mentors::create_mentor),
        )
        .route(
            "/mentors/{id}",
            get(admin::mentors::get_mentor)
                .patch(admin::mentors::update_mentor)
                .delete(admin::mentors::delete_mentor),
        )
        // Partners
        .route(
            "/partners",
            get(admin::partners::list_partners).post(admin::partners::create_partner),
        )
        .route(
            "/partners/{id}",
            get(admin::partners::get_partner)
                .patch(admin::partners::update_partner)
                .delete(admin::partners::delete_partner),
        )
        // Roadmaps
        .route(
            "/roadmaps",
            get(admin::roadmaps::list_roadmaps).post(admin::roadmaps::create_roadmap),
        )
        .route(
            "/roadmaps/{id}",
            get(admin::roadmaps::get_roadmap)
                .patch(admin::roadmaps::update_roadmap)
                .delete(admin::roadmaps::delete_roadmap),
        )
        .route("/roadmaps/{id}/steps", put(admin::roadmaps::replace_steps))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

async fn not_found() -> ApiError {
    ApiError(AppError::not_found("No such route").with_code("ROUTE_NOT_FOUND"))
}
