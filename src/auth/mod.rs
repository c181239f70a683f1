//! Authentication module: password hashing, session tokens, request gateway

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{SessionClaims, TokenCodec, TokenError};
pub use middleware::{auth_gateway, extract_token, Identity};
pub use password::{PasswordError, PasswordHasher};
