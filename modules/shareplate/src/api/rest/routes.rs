//! Route table.
//!
//! Authentication is the `CurrentUser` extractor, so protected and public
//! routes live side by side; role gates are the first line of each guarded
//! handler.

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use crate::state::AppState;

use super::handlers;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/forgot-password", post(handlers::forgot_password))
        .route("/api/auth/validate-otp", post(handlers::validate_otp))
        .route("/api/auth/reset-password", post(handlers::reset_password))
        .route("/api/auth/users", get(handlers::list_users))
        .route("/api/auth/user/{id}", get(handlers::get_user))
        .route(
            "/api/auth/users/{id}/deactivate",
            put(handlers::deactivate_user),
        )
        .route(
            "/api/food-listings",
            get(handlers::list_listings).post(handlers::create_listing),
        )
        .route(
            "/api/food-listings/available",
            get(handlers::list_available_listings),
        )
        .route(
            "/api/food-listings/restaurant",
            get(handlers::list_own_listings),
        )
        .route(
            "/api/food-listings/{id}",
            put(handlers::update_listing).delete(handlers::delete_listing),
        )
        .route(
            "/api/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route(
            "/api/reservations/user/{userId}",
            get(handlers::reservations_by_user),
        )
        .route(
            "/api/reservations/by-listings",
            get(handlers::reservations_by_listings),
        )
        .route(
            "/api/reservations/{id}",
            delete(handlers::cancel_reservation),
        )
        .route(
            "/api/reservations/{id}/pickup",
            put(handlers::confirm_pickup),
        )
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/upload-image", post(handlers::upload_image))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(super::openapi()) }),
        )
        .with_state(state)
}
