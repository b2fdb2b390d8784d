// Library exports for MOYAK Backend
// main.rs, the seed binary and the integration tests all build on these

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::AppConfig;
pub use db::{DieselDatabaseConfig, DieselPool};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use services::{BookingNotifier, EmailService, JwtConfig, JwtService};

use axum::{
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    response::IntoResponse,
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use middleware::{dynamic_cors_middleware, rate_limit_middleware, ApiRateLimiter};

/// Wire config, pool, migrations and services into an `AppState`
pub async fn initialize_app_state(
    config: &AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    info!("Initializing database pool...");
    let db_config = DieselDatabaseConfig::from_config(config);
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    migrations::run_all_migrations(config).await?;

    let jwt_service = Arc::new(JwtService::new(JwtConfig::from_app_config(config)));
    let notifier: Arc<dyn BookingNotifier> = Arc::new(EmailService::new(config)?);
    let rate_limiter = ApiRateLimiter::from_config(config).map(Arc::new);

    if rate_limiter.is_none() {
        info!("Rate limiting disabled");
    }

    Ok(AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        jwt_service,
        notifier,
        rate_limiter,
        max_connections,
    })
}

/// Full HTTP surface: everything under `/api`, with tracing, CORS and rate limiting
pub fn build_router(state: AppState) -> Router {
    let protected = handlers::protected_routes()
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let mut api = handlers::public_routes().merge(protected);
    if state.config.features.enable_api_docs {
        api = api.merge(handlers::docs_routes());
    }

    let api = api
        .fallback(api_not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(state.clone(), dynamic_cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn api_not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "Unknown API endpoint");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "NOT_FOUND",
            "message": "API endpoint not found"
        })),
    )
}
