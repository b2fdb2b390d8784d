// Middleware modules for MOYAK Backend

pub mod auth;
pub mod auth_middleware;
pub mod cors;
pub mod rate_limit;

pub use auth::AuthenticatedUser;
pub use auth_middleware::auth_middleware;
pub use cors::dynamic_cors_middleware;
pub use rate_limit::{rate_limit_middleware, ApiRateLimiter};
