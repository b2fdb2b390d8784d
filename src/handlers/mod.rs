// HTTP handlers and their route builders

pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod docs;
pub mod events;
pub mod health;
pub mod users;

use crate::app::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/events/public/{booking_link}", get(events::get_public_event))
        .route("/bookings", post(bookings::create_booking))
}

/// Routes behind `auth_middleware`
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/change-password", put(auth::change_password))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/{id}/availabilities",
            get(events::list_availabilities).post(events::add_availability),
        )
        .route(
            "/events/{id}/availabilities/{availability_id}",
            delete(events::delete_availability),
        )
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/bookings/{id}/status", put(bookings::update_booking_status))
        .route("/bookings/{id}/cancel", put(bookings::cancel_booking))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
}

pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/docs/openapi.json", get(docs::serve_openapi_spec))
}
