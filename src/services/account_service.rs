//! 账户服务：注册、登录、第三方登录、个人信息

use crate::{
    auth::{jwt::TokenCodec, password::PasswordHasher, PasswordError},
    error::AppError,
    models::{
        account::{AccountResponse, AuthMethod, NewAccount, OAuthProvider},
        auth::{CredentialsRequest, LoginResponse, ProviderLogin},
    },
    repository::AccountRepository,
};
use std::sync::Arc;
use validator::Validate;

/// 未知账户登录时用于校验的占位密码
const DUMMY_SECRET: &str = "dummy-secret-for-unknown-identifiers";

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    /// 未知账户也走一次 bcrypt 校验，使两种失败耗时一致
    dummy_hash: String,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: PasswordHasher,
        codec: Arc<TokenCodec>,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash(DUMMY_SECRET)?;

        Ok(Self {
            accounts,
            hasher,
            codec,
            dummy_hash,
        })
    }

    /// 注册本地账户
    pub async fn register(&self, req: CredentialsRequest) -> Result<AccountResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let secret_hash = self.hash_secret(req.secret).await?;

        let account = self
            .accounts
            .create(&NewAccount {
                identifier: req.identifier,
                auth_method: AuthMethod::Local,
                secret_hash: Some(secret_hash),
            })
            .await?;

        metrics::counter!("accounts_registered_total", "method" => "local").increment(1);
        tracing::info!(
            account_id = account.id,
            identifier = %account.identifier,
            "Account registered"
        );

        Ok(account.into())
    }

    /// 本地账户登录
    ///
    /// 账户不存在与密码错误返回相同的 401。
    pub async fn login(&self, req: CredentialsRequest) -> Result<LoginResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let account = self.accounts.find(&req.identifier, AuthMethod::Local).await?;

        let (hash, known) = match account.as_ref().and_then(|a| a.secret_hash.clone()) {
            Some(hash) => (hash, true),
            None => (self.dummy_hash.clone(), false),
        };

        let verified = self.verify_secret(req.secret, hash).await;

        match (verified, known) {
            (Ok(()), true) => {}
            (Ok(()), false) | (Err(PasswordError::Mismatch), _) => {
                let reason = if known { "secret mismatch" } else { "unknown identifier" };
                tracing::debug!(identifier = %req.identifier, reason, "Login failure detail");
                metrics::counter!("login_failures_total").increment(1);
                tracing::info!(identifier = %req.identifier, "Login rejected");
                return Err(PasswordError::Mismatch.into());
            }
            (Err(e), _) => return Err(e.into()),
        }

        let token = self.codec.issue(&req.identifier, AuthMethod::Local)?;

        metrics::counter!("logins_total", "method" => "local").increment(1);
        tracing::info!(identifier = %req.identifier, "Login succeeded");

        Ok(LoginResponse { token })
    }

    /// 第三方提供方回调
    ///
    /// 首次出现的邮箱只建账户，不签发令牌；之后的回调签发以邮箱为 subject、
    /// 以提供方为认证方式的令牌。
    pub async fn login_via_provider(
        &self,
        email: &str,
        provider: OAuthProvider,
    ) -> Result<ProviderLogin, AppError> {
        if email.trim().is_empty() {
            return Err(AppError::BadRequest("provider returned no email".to_string()));
        }

        let method = AuthMethod::OAuth(provider);

        if self.accounts.find(email, method).await?.is_none() {
            let account = self
                .accounts
                .create(&NewAccount {
                    identifier: email.to_string(),
                    auth_method: method,
                    secret_hash: None,
                })
                .await?;

            metrics::counter!("accounts_registered_total", "method" => provider.as_str())
                .increment(1);
            tracing::info!(
                account_id = account.id,
                provider = %provider,
                "Provider account registered"
            );

            return Ok(ProviderLogin::Registered {
                account: account.into(),
            });
        }

        let token = self.codec.issue(email, method)?;

        metrics::counter!("logins_total", "method" => provider.as_str()).increment(1);
        tracing::info!(provider = %provider, "Provider login succeeded");

        Ok(ProviderLogin::Authenticated { token })
    }

    /// 当前身份对应的账户，按 (subject, 认证方式) 精确查找
    pub async fn profile(
        &self,
        subject: &str,
        method: AuthMethod,
    ) -> Result<AccountResponse, AppError> {
        self.accounts
            .find(subject, method)
            .await?
            .map(AccountResponse::from)
            .ok_or_else(|| AppError::NotFound("account not found".to_string()))
    }

    async fn hash_secret(&self, secret: String) -> Result<String, AppError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(AppError::from)
    }

    async fn verify_secret(&self, secret: String, hash: String) -> Result<(), PasswordError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| PasswordError::Hashing(format!("verify task failed: {}", e)))?
    }
}
