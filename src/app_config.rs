// Centralized configuration management for MOYAK Backend
// Every setting comes from the environment, read once in main

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    /// Frontend URL used for links in emails
    pub client_url: String,
    /// Timezone applied to bookings and users that do not send one
    pub default_timezone: String,

    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub email: EmailConfig,
    pub features: FeatureConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub expiry: u64,
    pub audience: String,
    pub issuer: String,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Vec<String>,
    /// Requests allowed per client IP inside one window
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    /// One reverse proxy sits in front and appends to X-Forwarded-For
    pub trust_proxy: bool,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Notifications are skipped when no API key is configured
    pub api_key: Option<String>,
    pub api_url: String,
    pub from_email: String,
    pub from_name: String,
    pub timeout_secs: u64,
}

impl EmailConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

/// Feature flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub enable_rate_limiting: bool,
    pub enable_api_docs: bool,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get required env var
        let get_required = |key: &str| -> Result<String, ConfigError> {
            env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))
        };

        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_or_default = |key: &str, default: &str| -> Result<u32, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u32".to_string())
            })
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));

        let port: u16 = get_or_default("PORT", "5000").parse().map_err(|_| {
            ConfigError::InvalidValue("PORT".to_string(), "not a valid port".to_string())
        })?;
        let server = ServerConfig {
            host: get_or_default("HOST", "0.0.0.0"),
            port,
            rust_log: get_or_default("RUST_LOG", "info"),
        };

        let database = DatabaseConfig {
            url: get_required("DATABASE_URL")?,
            max_connections: parse_or_default("DATABASE_MAX_CONNECTIONS", "20")?,
            min_connections: parse_or_default("DATABASE_MIN_CONNECTIONS", "2")?,
            connect_timeout: parse_u64_or_default("DATABASE_CONNECT_TIMEOUT", "30")?,
            idle_timeout: parse_u64_or_default("DATABASE_IDLE_TIMEOUT", "600")?,
            max_lifetime: parse_u64_or_default("DATABASE_MAX_LIFETIME", "1800")?,
        };

        // JWT secret validation
        let jwt_secret = get_required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET".to_string(),
                "Secret must be at least 32 characters long".to_string(),
            ));
        }

        let jwt = JwtConfig {
            secret: jwt_secret,
            expiry: parse_u64_or_default("JWT_EXPIRY", "604800")?,
            audience: get_or_default("JWT_AUDIENCE", "moyak"),
            issuer: get_or_default("JWT_ISSUER", "moyak-backend"),
        };

        let bcrypt_cost = parse_or_default("BCRYPT_COST", "12")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "BCRYPT_COST".to_string(),
                "Cost must be between 4 and 31".to_string(),
            ));
        }

        let security = SecurityConfig {
            bcrypt_cost,
            cors_allowed_origins: get_or_default("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit_max_requests: parse_or_default("RATE_LIMIT_MAX_REQUESTS", "100")?,
            rate_limit_window_secs: parse_u64_or_default("RATE_LIMIT_WINDOW_SECS", "900")?,
            trust_proxy: parse_bool_or_default("TRUST_PROXY", "false"),
        };

        let email = EmailConfig {
            api_key: env::var("EMAIL_API_KEY").ok().filter(|key| !key.is_empty()),
            api_url: get_or_default("EMAIL_API_URL", "https://api.resend.com/emails"),
            from_email: get_or_default("EMAIL_FROM", "noreply@moyak.com"),
            from_name: get_or_default("EMAIL_FROM_NAME", "MOYAK"),
            timeout_secs: parse_u64_or_default("EMAIL_TIMEOUT_SECS", "10")?,
        };

        let features = FeatureConfig {
            // Development traffic is never throttled
            enable_rate_limiting: parse_bool_or_default("ENABLE_RATE_LIMITING", "true")
                && environment != Environment::Development,
            enable_api_docs: parse_bool_or_default("ENABLE_API_DOCS", "false"),
            run_migrations: parse_bool_or_default("RUN_MIGRATIONS", "true"),
        };

        Ok(Self {
            environment,
            client_url: get_or_default("CLIENT_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            default_timezone: get_or_default("DEFAULT_TIMEZONE", "Asia/Seoul"),
            server,
            database,
            jwt,
            security,
            email,
            features,
        })
    }

    /// Configuration for tests; reads only `DATABASE_URL`, everything else is fixed
    pub fn for_test() -> Self {
        Self {
            environment: Environment::Test,
            client_url: "http://localhost:3000".to_string(),
            default_timezone: "Asia/Seoul".to_string(),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                rust_log: "debug".to_string(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_default(),
                max_connections: 5,
                min_connections: 1,
                connect_timeout: 5,
                idle_timeout: 60,
                max_lifetime: 300,
            },
            jwt: JwtConfig {
                secret: "test-jwt-secret-that-is-long-enough-for-hs256".to_string(),
                expiry: 3600,
                audience: "test.moyak".to_string(),
                issuer: "test.moyak".to_string(),
            },
            security: SecurityConfig {
                bcrypt_cost: 4,
                cors_allowed_origins: vec!["*".to_string()],
                rate_limit_max_requests: 100,
                rate_limit_window_secs: 900,
                trust_proxy: false,
            },
            email: EmailConfig {
                api_key: None,
                api_url: "http://127.0.0.1:9/emails".to_string(),
                from_email: "noreply@moyak.com".to_string(),
                from_name: "MOYAK".to_string(),
                timeout_secs: 1,
            },
            features: FeatureConfig {
                enable_rate_limiting: false,
                enable_api_docs: true,
                run_migrations: true,
            },
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if running in test environment
    pub fn is_test(&self) -> bool {
        self.environment == Environment::Test
    }
}
