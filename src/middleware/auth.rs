// Authenticated caller extracted from a validated access token

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{models::auth::AccessTokenClaims, services::jwt::JwtError};

/// Authenticated user information extracted from JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token_id: String,
    pub email: String,
    pub exp: u64,
}

impl TryFrom<AccessTokenClaims> for AuthenticatedUser {
    type Error = JwtError;

    fn try_from(claims: AccessTokenClaims) -> Result<Self, Self::Error> {
        let user_id = claims.user_id().ok_or(JwtError::InvalidToken)?;

        Ok(Self {
            user_id,
            token_id: claims.jti,
            email: claims.email,
            exp: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::TokenScope;

    fn claims(sub: &str) -> AccessTokenClaims {
        let scope = TokenScope {
            audience: "moyak",
            issuer: "moyak-backend",
        };
        let mut claims = AccessTokenClaims::issue(Uuid::nil(), "host@moyak.com", scope, 0, 60);
        claims.sub = sub.to_string();
        claims
    }

    #[test]
    fn test_claims_with_uuid_subject() {
        let id = Uuid::new_v4();
        let user = AuthenticatedUser::try_from(claims(&id.to_string())).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.email, "host@moyak.com");
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        assert!(matches!(
            AuthenticatedUser::try_from(claims("42")),
            Err(JwtError::InvalidToken)
        ));
    }
}
