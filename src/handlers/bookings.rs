// Booking handlers: guest creation plus the host's list, detail and status actions

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
    middleware::auth::AuthenticatedUser,
    models::booking::{
        Booking, BookingStatus, BookingWithEvent, CreateBookingRequest, UpdateBookingStatusRequest,
    },
    services::BookingService,
    utils::api_error::{ApiError, ApiResult, ErrorResponse},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingWithEvent>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDetailResponse {
    pub booking: BookingWithEvent,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    pub message: String,
    pub booking: Booking,
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Bookings on the host's events", body = BookingListResponse))
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<BookingListResponse>> {
    let bookings = BookingService::new(&state)
        .list_for_host(auth_user.user_id)
        .await?;

    Ok(Json(BookingListResponse { bookings }))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking detail", body = BookingDetailResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<BookingDetailResponse>> {
    let booking = BookingService::new(&state)
        .get_for_host(auth_user.user_id, booking_id)
        .await?;

    Ok(Json(BookingDetailResponse { booking }))
}

/// Guests book without a token
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking requested", body = BookingResponse),
        (status = 400, description = "Validation failed or slot already booked", body = ErrorResponse),
        (status = 404, description = "Event missing or inactive", body = ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateBookingRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let booking = BookingService::new(&state).create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            message: "예약이 성공적으로 신청되었습니다.".to_string(),
            booking,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}/status",
    tag = "Bookings",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Booking confirmed or declined", body = BookingResponse),
        (status = 400, description = "Invalid status, missing reason or conflicting slot", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    )
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateBookingStatusRequest>, ApiError>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = BookingService::new(&state)
        .update_status(auth_user.user_id, booking_id, request)
        .await?;

    let message = match booking.status {
        BookingStatus::Confirmed => "예약이 확정되었습니다.",
        _ => "예약이 거절되었습니다.",
    };

    Ok(Json(BookingResponse {
        message: message.to_string(),
        booking,
    }))
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}/cancel",
    tag = "Bookings",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 400, description = "Already cancelled or declined", body = ErrorResponse),
        (status = 404, description = "Booking not found", body = ErrorResponse)
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = BookingService::new(&state)
        .cancel(auth_user.user_id, booking_id)
        .await?;

    Ok(Json(BookingResponse {
        message: "예약이 취소되었습니다.".to_string(),
        booking,
    }))
}
