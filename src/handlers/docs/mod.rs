// API Documentation - OpenAPI document generated from the handler annotations

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    handlers::{auth, bookings, dashboard, events, health, users},
    models::{
        availability::{Availability, AvailabilityInput},
        booking::{
            Booking, BookingStatus, BookingWithEvent, CreateBookingRequest, EventSummary,
            UpdateBookingStatusRequest,
        },
        event::{
            CreateEventRequest, Event, EventHost, EventWithAvailabilities, LocationType,
            PublicEvent, UpdateEventRequest,
        },
        user::UserProfile,
    },
    services::dashboard::{DashboardStats, RecentBooking, UpcomingEvent},
    utils::api_error::{ApiError, ErrorResponse, FieldError},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MOYAK Backend API",
        version = "1.0.0",
        description = "Booking scheduler: hosts publish events, guests request time slots"
    ),
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::get_current_user,
        auth::change_password,
        events::list_events,
        events::create_event,
        events::get_event,
        events::update_event,
        events::delete_event,
        events::get_public_event,
        events::list_availabilities,
        events::add_availability,
        events::delete_availability,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::create_booking,
        bookings::update_booking_status,
        bookings::cancel_booking,
        users::get_profile,
        users::update_profile,
        dashboard::get_dashboard,
    ),
    components(schemas(
        ErrorResponse,
        FieldError,
        health::HealthResponse,
        health::DatabaseHealth,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::ChangePasswordRequest,
        auth::AuthResponse,
        auth::UserResponse,
        auth::MessageResponse,
        UserProfile,
        users::UpdateProfileRequest,
        users::ProfileUpdatedResponse,
        LocationType,
        Event,
        EventHost,
        EventWithAvailabilities,
        PublicEvent,
        CreateEventRequest,
        UpdateEventRequest,
        Availability,
        AvailabilityInput,
        events::EventListResponse,
        events::EventResponse,
        events::PublicEventResponse,
        events::AvailabilityListResponse,
        events::AvailabilityResponse,
        BookingStatus,
        Booking,
        EventSummary,
        BookingWithEvent,
        CreateBookingRequest,
        UpdateBookingStatusRequest,
        bookings::BookingListResponse,
        bookings::BookingDetailResponse,
        bookings::BookingResponse,
        DashboardStats,
        RecentBooking,
        UpcomingEvent,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Authentication", description = "Host registration and sign-in"),
        (name = "Events", description = "Event types, availability and public booking pages"),
        (name = "Bookings", description = "Guest booking requests and host decisions"),
        (name = "Users", description = "Host profile"),
        (name = "Dashboard", description = "Per-host booking aggregates"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document at /api/docs/openapi.json
pub async fn serve_openapi_spec() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            spec,
        )
            .into_response(),
        Err(e) => ApiError::Internal(format!("Failed to render OpenAPI document: {}", e))
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_booking_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();

        assert!(paths.contains_key("/api/bookings"));
        assert!(paths.contains_key("/api/bookings/{id}/status"));
        assert!(paths.contains_key("/api/events/public/{booking_link}"));
        assert!(doc["components"]["securitySchemes"]["bearerAuth"].is_object());
    }
}
