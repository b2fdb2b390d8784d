// User profile handlers

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    handlers::auth::UserResponse,
    middleware::auth::AuthenticatedUser,
    models::user::{User, UserProfile, UserUpdate},
    utils::{
        api_error::{ApiError, ApiResult, ErrorResponse},
        trim_optional_field,
    },
};

/// Omitted or blank fields keep their current value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Timezone must be 1-64 characters"))]
    pub timezone: Option<String>,

    #[validate(length(max = 255, message = "Calendar id must be less than 255 characters"))]
    pub google_calendar_id: Option<String>,

    #[validate(length(max = 255, message = "Calendar id must be less than 255 characters"))]
    pub outlook_calendar_id: Option<String>,
}

impl UpdateProfileRequest {
    fn into_update(self) -> UserUpdate {
        UserUpdate {
            name: trim_optional_field(self.name.as_ref()),
            timezone: trim_optional_field(self.timezone.as_ref()),
            google_calendar_id: trim_optional_field(self.google_calendar_id.as_ref()).map(Some),
            outlook_calendar_id: trim_optional_field(self.outlook_calendar_id.as_ref()).map(Some),
            ..UserUpdate::default()
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileUpdatedResponse {
    pub message: String,
    pub user: UserProfile,
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Profile of the signed-in user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let mut conn = state.diesel_pool.get().await?;
    let user = User::find_by_id(&mut conn, auth_user.user_id).await?;

    Ok(Json(UserResponse { user: user.into() }))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "Users",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdatedResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    request.validate()?;

    let update = request.into_update();
    let mut conn = state.diesel_pool.get().await?;

    let user = if update.is_empty() {
        User::find_by_id(&mut conn, auth_user.user_id).await?
    } else {
        let user = User::update(&mut conn, auth_user.user_id, update).await?;
        info!(user_id = %user.id, "Profile updated");
        user
    };

    Ok(Json(ProfileUpdatedResponse {
        message: "프로필이 성공적으로 수정되었습니다.".to_string(),
        user: user.into(),
    }))
}
