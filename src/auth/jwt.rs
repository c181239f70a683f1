//! Session token issuance and verification
//! HS256 JWT carrying the account identifier and auth method, valid for a fixed TTL

use crate::{
    config::{AppConfig, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, MIN_TOKEN_TTL_SECS},
    models::account::AuthMethod,
};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong segment count, undecodable payload or unknown provider
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Session claims embedded in the token payload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (account identifier or email)
    pub sub: String,

    /// "local" or the provider name; an identifier is only unique per method
    pub provider: String,

    /// Issued at, seconds since epoch (UTC)
    pub iat: i64,

    /// Expiration, seconds since epoch (UTC)
    pub exp: i64,
}

impl SessionClaims {
    pub fn auth_method(&self) -> Result<AuthMethod, TokenError> {
        AuthMethod::from_provider_key(&self.provider).map_err(|_| TokenError::Malformed)
    }
}

/// Signs and verifies session tokens with a single shared secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenCodec {
    /// Create codec from config
    pub fn from_config(config: &AppConfig) -> Result<Self, TokenError> {
        Self::new(
            config.security.jwt_secret.expose_secret().as_bytes(),
            config.security.token_ttl_secs,
        )
    }

    pub fn new(secret: &[u8], ttl_secs: u64) -> Result<Self, TokenError> {
        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(TokenError::Encoding(
                "signing secret too short (min 32 bytes)".to_string(),
            ));
        }

        let ttl_secs = i64::try_from(ttl_secs)
            .ok()
            .filter(|ttl| (MIN_TOKEN_TTL_SECS as i64..=MAX_TOKEN_TTL_SECS as i64).contains(ttl))
            .ok_or_else(|| {
                TokenError::Encoding(format!(
                    "token ttl must be between {} and {} seconds",
                    MIN_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS
                ))
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        // 过期判断由 check_expiry 负责，库只做签名校验
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        })
    }

    /// Codec with the default 15 minute TTL
    pub fn with_default_ttl(secret: &[u8]) -> Result<Self, TokenError> {
        Self::new(secret, DEFAULT_TOKEN_TTL_SECS)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a token for `subject`, valid from now for the configured TTL
    pub fn issue(&self, subject: &str, method: AuthMethod) -> Result<String, TokenError> {
        self.issue_at(subject, method, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: &str,
        method: AuthMethod,
        now: i64,
    ) -> Result<String, TokenError> {
        let exp = now
            .checked_add(self.ttl_secs)
            .ok_or_else(|| TokenError::Encoding("token expiry out of range".to_string()))?;

        let claims = SessionClaims {
            sub: subject.to_string(),
            provider: method.provider_key().to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// Verify signature and expiry against the wall clock
    pub fn parse_and_verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.parse_and_verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, then expiry as of `now`.
    ///
    /// A token is valid through its `exp` second and expired once `now > exp`.
    pub fn parse_and_verify_at(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                }
            })?
            .claims;

        check_expiry(&claims, now)?;
        claims.auth_method()?;

        Ok(claims)
    }
}

fn check_expiry(claims: &SessionClaims, now: i64) -> Result<(), TokenError> {
    if claims.exp < now {
        return Err(TokenError::Expired);
    }
    Ok(())
}
