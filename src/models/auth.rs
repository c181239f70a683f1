//! Authentication-related models

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::account::AccountResponse;

/// Register / login request
#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[serde(alias = "account_id")]
    #[validate(length(min = 1, max = 255, message = "identifier must be 1-255 characters"))]
    pub identifier: String,

    #[serde(alias = "account_pwd")]
    #[validate(
        length(min = 1, message = "secret must not be empty"),
        custom(function = "validate_secret_bytes")
    )]
    pub secret: String,
}

/// bcrypt 只使用前 72 字节，按字节而不是字符计数
pub const MAX_SECRET_BYTES: usize = 72;

fn validate_secret_bytes(secret: &str) -> Result<(), ValidationError> {
    if secret.len() > MAX_SECRET_BYTES {
        return Err(ValidationError::new("secret_too_long")
            .with_message(Cow::Borrowed("secret must be at most 72 bytes")));
    }
    Ok(())
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Outcome of a provider callback
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderLogin {
    /// 首次登录：账户已创建，需要重新认证
    Registered { account: AccountResponse },
    Authenticated { token: String },
}
