// JWT claims for host sessions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token claims carried in the `Authorization: Bearer` header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Host user id
    pub sub: String,
    pub jti: String,
    pub email: String,
    pub aud: String,
    pub iss: String,
    /// Unix seconds
    pub iat: u64,
    pub exp: u64,
}

/// Who a token is for and who issued it
#[derive(Debug, Clone, Copy)]
pub struct TokenScope<'a> {
    pub audience: &'a str,
    pub issuer: &'a str,
}

impl AccessTokenClaims {
    /// Fresh claims with a random token id, valid for `ttl_secs` from `issued_at`
    pub fn issue(
        user_id: Uuid,
        email: &str,
        scope: TokenScope<'_>,
        issued_at: u64,
        ttl_secs: u64,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: email.to_string(),
            aud: scope.audience.to_string(),
            iss: scope.issuer.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }

    /// The subject as a user id; None for tokens we did not mint
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}
