// JWT Token Service
// HS256 access tokens for host authentication

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{AccessTokenClaims, TokenScope};

// Error types for JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    TokenCreation(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::InvalidToken,
        }
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    /// Access token lifetime in seconds
    pub access_token_expiry: u64,
    pub algorithm: Algorithm,
    pub audience: String,
    pub issuer: String,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    /// Build JWT config from provided parameters, shared by from_app_config and for_test
    pub fn build_from_params(secret: &str, expiry: u64, audience: String, issuer: String) -> Self {
        JwtConfig {
            access_token_expiry: expiry,
            algorithm: Algorithm::HS256,
            audience,
            issuer,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn from_app_config(config: &crate::app_config::AppConfig) -> Self {
        let crate::app_config::JwtConfig {
            secret,
            expiry,
            audience,
            issuer,
        } = &config.jwt;

        Self::build_from_params(secret, *expiry, audience.clone(), issuer.clone())
    }

    /// Fixed secret and short expiry for tests
    pub fn for_test() -> Self {
        Self::build_from_params(
            "test-jwt-secret-that-is-long-enough-for-hs256",
            3600,
            "test.moyak".to_string(),
            "test.moyak".to_string(),
        )
    }
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Generate access token
    pub fn generate_access_token(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::TokenCreation(e.to_string()))?
            .as_secs();

        let claims = AccessTokenClaims::issue(
            user_id,
            email,
            TokenScope {
                audience: &self.config.audience,
                issuer: &self.config.issuer,
            },
            now,
            self.config.access_token_expiry,
        );

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.config.encoding_key,
        )
        .map_err(|e| JwtError::TokenCreation(e.to_string()))
    }

    /// Validate signature, audience, issuer and expiry
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<AccessTokenClaims>(token, &self.config.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = JwtService::new(JwtConfig::for_test());
        let user_id = Uuid::new_v4();

        let token = service
            .generate_access_token(user_id, "host@moyak.com")
            .expect("Failed to generate token");
        let claims = service
            .validate_access_token(&token)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "host@moyak.com");
        assert_eq!(claims.aud, "test.moyak");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        let other = JwtService::new(JwtConfig::build_from_params(
            "another-secret-that-is-also-long-enough-here",
            3600,
            "test.moyak".to_string(),
            "test.moyak".to_string(),
        ));

        let token = other
            .generate_access_token(Uuid::new_v4(), "x@moyak.com")
            .unwrap();
        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        let other = JwtService::new(JwtConfig::build_from_params(
            "test-jwt-secret-that-is-long-enough-for-hs256",
            3600,
            "someone-else".to_string(),
            "test.moyak".to_string(),
        ));

        let token = other
            .generate_access_token(Uuid::new_v4(), "x@moyak.com")
            .unwrap();
        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = JwtConfig::for_test();
        let service = JwtService::new(config.clone());

        let claims = AccessTokenClaims::issue(
            Uuid::new_v4(),
            "x@moyak.com",
            TokenScope {
                audience: &config.audience,
                issuer: &config.issuer,
            },
            1_000,
            1_000,
        );
        let token = encode(&Header::new(Algorithm::HS256), &claims, &config.encoding_key).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = JwtService::new(JwtConfig::for_test());
        assert!(matches!(
            service.validate_access_token("not.a.jwt"),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", JwtConfig::for_test());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("test-jwt-secret"));
    }
}
