// Password hashing and verification utilities using bcrypt

use thiserror::Error;

/// Errors that can occur during password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingError(String),

    #[error("Failed to verify password: {0}")]
    VerificationError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Configuration for bcrypt password hashing
#[derive(Debug, Clone, Copy)]
pub struct PasswordConfig {
    /// Work factor, each step doubles hashing time
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordConfig {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

/// Hash a password using bcrypt with the default cost
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_config(password, &PasswordConfig::default())
}

/// Hash a password using bcrypt with custom configuration
///
/// # Returns
/// * `Result<String, PasswordError>` - The hash in modular crypt format (`$2b$...`)
pub fn hash_password_with_config(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, PasswordError> {
    bcrypt::hash(password, config.cost).map_err(|e| PasswordError::HashingError(e.to_string()))
}

/// Verify a password against a bcrypt hash
///
/// # Returns
/// * `Result<bool, PasswordError>` - True if the password matches, false otherwise
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    match bcrypt::verify(password, hash) {
        Ok(matches) => Ok(matches),
        Err(bcrypt::BcryptError::InvalidHash(_)) | Err(bcrypt::BcryptError::InvalidPrefix(_)) => {
            Err(PasswordError::InvalidHashFormat)
        },
        Err(e) => Err(PasswordError::VerificationError(e.to_string())),
    }
}

/// Hash on the blocking pool so request workers stay free
pub async fn hash_password_async(password: String, cost: u32) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || {
        hash_password_with_config(&password, &PasswordConfig::with_cost(cost))
    })
    .await
    .map_err(|e| PasswordError::HashingError(e.to_string()))?
}

/// Verify on the blocking pool so request workers stay free
pub async fn verify_password_async(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerificationError(e.to_string()))?
}
