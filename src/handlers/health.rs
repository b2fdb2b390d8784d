// Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{app::AppState, db};

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
    /// `healthy` or `unhealthy`
    pub status: &'static str,
    pub max_connections: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `OK` or `DEGRADED`
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub database: DatabaseHealth,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    let (status_code, database) = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(()) => (
            StatusCode::OK,
            DatabaseHealth {
                status: "healthy",
                max_connections: state.max_connections,
                error: None,
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                DatabaseHealth {
                    status: "unhealthy",
                    max_connections: state.max_connections,
                    error: Some(format!("Database connection failed: {}", e)),
                },
            )
        },
    };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK { "OK" } else { "DEGRADED" },
        message: "MOYAK 서버가 정상적으로 실행 중입니다.",
        timestamp,
        database,
    };

    (status_code, Json(response))
}
