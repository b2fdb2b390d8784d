// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::DieselPool,
    middleware::ApiRateLimiter,
    services::{BookingNotifier, JwtService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub jwt_service: Arc<JwtService>,
    pub notifier: Arc<dyn BookingNotifier>,
    /// None when rate limiting is disabled
    pub rate_limiter: Option<Arc<ApiRateLimiter>>,
    pub max_connections: u32,
}
