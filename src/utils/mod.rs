// Utility modules for MOYAK Backend

pub mod api_error;
pub mod password;
pub mod validation;

pub use api_error::{ApiError, ApiResult, FieldError};
pub use password::{
    hash_password, hash_password_async, hash_password_with_config, verify_password,
    verify_password_async, PasswordConfig, PasswordError,
};
pub use validation::{parse_time_of_day, trim_optional_field};
