// Dashboard handler

use axum::{extract::State, Json};

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    services::{DashboardService, DashboardStats},
    utils::api_error::{ApiResult, ErrorResponse},
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Booking totals plus recent bookings and active events", body = DashboardStats),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<DashboardStats>> {
    let stats = DashboardService::new(&state)
        .stats(auth_user.user_id)
        .await?;

    Ok(Json(stats))
}
