// Authentication Handlers for MOYAK Backend
// Register, login, current user and password change

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::user::{NewUser, User, UserError, UserProfile},
    utils::{
        api_error::{ApiError, ApiResult},
        hash_password_async, trim_optional_field, verify_password_async,
    },
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "홍길동",
    "email": "host@moyak.com",
    "password": "secret123"
}))]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 255, message = "Name must be between 2 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 255, message = "Email must be less than 255 characters"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 64, message = "Timezone must be 1-64 characters"))]
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// =============================================================================
// AUTHENTICATION HANDLERS
// =============================================================================

/// POST /api/auth/register - Create a host account and sign it in
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failed or email taken", body = crate::utils::api_error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(mut request), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    request.name = request.name.trim().to_string();
    request.email = request.email.trim().to_lowercase();
    request.timezone = trim_optional_field(request.timezone.as_ref());
    request.validate()?;

    let password_hash =
        hash_password_async(request.password, state.config.security.bcrypt_cost).await?;
    let timezone = request
        .timezone
        .unwrap_or_else(|| state.config.default_timezone.clone());
    let new_user = NewUser::new(&request.email, password_hash, &request.name, &timezone);

    let mut conn = state.diesel_pool.get().await?;
    let user = User::create(&mut conn, new_user).await?;
    let token = state
        .jwt_service
        .generate_access_token(user.id, &user.email)?;

    info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "회원가입이 완료되었습니다.".to_string(),
            token,
            expires_in: state.jwt_service.access_token_expiry(),
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/login - Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = crate::utils::api_error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(mut request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<Json<AuthResponse>> {
    request.email = request.email.trim().to_lowercase();
    request.validate()?;

    let mut conn = state.diesel_pool.get().await?;
    let user = match User::find_by_email(&mut conn, &request.email).await {
        Ok(user) => user,
        Err(UserError::NotFound) => {
            warn!(email = %request.email, "Login attempt for unknown email");
            return Err(ApiError::InvalidCredentials);
        },
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        warn!(user_id = %user.id, "Login attempt for inactive account");
        return Err(ApiError::InvalidCredentials);
    }

    if !verify_password_async(request.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    User::touch(&mut conn, user.id).await?;
    let token = state
        .jwt_service
        .generate_access_token(user.id, &user.email)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "로그인되었습니다.".to_string(),
        token,
        expires_in: state.jwt_service.access_token_expiry(),
        user: user.into(),
    }))
}

/// GET /api/auth/me - The signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = crate::utils::api_error::ErrorResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<UserResponse>> {
    let mut conn = state.diesel_pool.get().await?;
    let user = User::find_by_id(&mut conn, auth_user.user_id).await?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// PUT /api/auth/change-password - Replace the password after checking the current one
#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    tag = "Authentication",
    security(("bearerAuth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation failed", body = crate::utils::api_error::ErrorResponse),
        (status = 401, description = "Current password is wrong", body = crate::utils::api_error::ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    WithRejection(Json(request), _): WithRejection<Json<ChangePasswordRequest>, ApiError>,
) -> ApiResult<Json<MessageResponse>> {
    request.validate()?;

    let mut conn = state.diesel_pool.get().await?;
    let user = User::find_by_id(&mut conn, auth_user.user_id).await?;

    if !verify_password_async(request.current_password, user.password_hash).await? {
        return Err(ApiError::field("currentPassword", "현재 비밀번호가 올바르지 않습니다."));
    }

    let password_hash =
        hash_password_async(request.new_password, state.config.security.bcrypt_cost).await?;
    User::update_password(&mut conn, user.id, &password_hash).await?;

    info!(user_id = %user.id, "Password changed");

    Ok(Json(MessageResponse {
        message: "비밀번호가 변경되었습니다.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            name: "홍".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            timezone: None,
        };

        let err = ApiError::from(request.validate().unwrap_err());
        let ApiError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert!(names.contains(&"name"));
        assert!(names.contains(&"email"));
        assert!(names.contains(&"password"));
    }

    #[test]
    fn test_change_password_body_is_camel_case() {
        let request: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "currentPassword": "old-secret",
            "newPassword": "new-secret"
        }))
        .unwrap();

        assert_eq!(request.current_password, "old-secret");
        assert!(request.validate().is_ok());
    }
}
