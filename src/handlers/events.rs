// Event handlers: host event CRUD, nested availabilities and the public lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    app::AppState,
    handlers::auth::MessageResponse,
    middleware::auth::AuthenticatedUser,
    models::{
        availability::{Availability, AvailabilityInput},
        event::{CreateEventRequest, EventWithAvailabilities, PublicEvent, UpdateEventRequest},
    },
    services::EventService,
    utils::api_error::{ApiError, ApiResult, ErrorResponse},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    pub events: Vec<EventWithAvailabilities>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub event: EventWithAvailabilities,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicEventResponse {
    pub event: PublicEvent,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityListResponse {
    pub availabilities: Vec<Availability>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub message: String,
    pub availability: Availability,
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "The host's events", body = EventListResponse))
)]
pub async fn list_events(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<EventListResponse>> {
    let events = EventService::new(&state).list(auth_user.user_id).await?;
    Ok(Json(EventListResponse { events }))
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    security(("bearerAuth" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateEventRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let event = EventService::new(&state)
        .create(auth_user.user_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: Some("이벤트가 성공적으로 생성되었습니다.".to_string()),
            event,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "Events",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event detail", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::new(&state)
        .get(auth_user.user_id, event_id)
        .await?;

    Ok(Json(EventResponse {
        message: None,
        event,
    }))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    tag = "Events",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateEventRequest>, ApiError>,
) -> ApiResult<Json<EventResponse>> {
    let event = EventService::new(&state)
        .update(auth_user.user_id, event_id, request)
        .await?;

    Ok(Json(EventResponse {
        message: Some("이벤트가 성공적으로 수정되었습니다.".to_string()),
        event,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    tag = "Events",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    EventService::new(&state)
        .delete(auth_user.user_id, event_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "이벤트가 성공적으로 삭제되었습니다.".to_string(),
    }))
}

/// Guests reach this without a token
#[utoipa::path(
    get,
    path = "/api/events/public/{booking_link}",
    tag = "Events",
    params(("booking_link" = String, Path, description = "Public booking link")),
    responses(
        (status = 200, description = "Active event with active availabilities", body = PublicEventResponse),
        (status = 404, description = "No active event behind this link", body = ErrorResponse)
    )
)]
pub async fn get_public_event(
    State(state): State<AppState>,
    Path(booking_link): Path<String>,
) -> ApiResult<Json<PublicEventResponse>> {
    let event = EventService::new(&state).find_public(&booking_link).await?;
    Ok(Json(PublicEventResponse { event }))
}

// =============================================================================
// AVAILABILITIES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/events/{id}/availabilities",
    tag = "Events",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Availabilities of the event", body = AvailabilityListResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn list_availabilities(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> ApiResult<Json<AvailabilityListResponse>> {
    let availabilities = EventService::new(&state)
        .list_availabilities(auth_user.user_id, event_id)
        .await?;

    Ok(Json(AvailabilityListResponse { availabilities }))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/availabilities",
    tag = "Events",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Event id")),
    request_body = AvailabilityInput,
    responses(
        (status = 201, description = "Availability added", body = AvailabilityResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn add_availability(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<AvailabilityInput>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let availability = EventService::new(&state)
        .add_availability(auth_user.user_id, event_id, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AvailabilityResponse {
            message: "가능 시간이 추가되었습니다.".to_string(),
            availability,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}/availabilities/{availability_id}",
    tag = "Events",
    security(("bearerAuth" = [])),
    params(
        ("id" = Uuid, Path, description = "Event id"),
        ("availability_id" = Uuid, Path, description = "Availability id")
    ),
    responses(
        (status = 200, description = "Availability removed", body = MessageResponse),
        (status = 404, description = "Event or availability not found", body = ErrorResponse)
    )
)]
pub async fn delete_availability(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((event_id, availability_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    EventService::new(&state)
        .delete_availability(auth_user.user_id, event_id, availability_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "가능 시간이 삭제되었습니다.".to_string(),
    }))
}
