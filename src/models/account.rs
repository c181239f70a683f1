//! Account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Third-party identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
            OAuthProvider::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            "github" => Ok(OAuthProvider::Github),
            other => Err(format!(
                "unsupported provider '{}': use google, facebook or github",
                other
            )),
        }
    }
}

/// How an account authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "provider", rename_all = "lowercase")]
pub enum AuthMethod {
    /// 本地密码
    Local,
    #[serde(rename = "oauth")]
    OAuth(OAuthProvider),
}

impl AuthMethod {
    /// 存储键：本地账户为 "local"，否则为提供方名称
    pub fn provider_key(&self) -> &'static str {
        match self {
            AuthMethod::Local => "local",
            AuthMethod::OAuth(provider) => provider.as_str(),
        }
    }

    pub fn from_provider_key(key: &str) -> Result<Self, String> {
        if key == "local" {
            Ok(AuthMethod::Local)
        } else {
            key.parse().map(AuthMethod::OAuth)
        }
    }
}

/// Stored account (with credential hash)
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub identifier: String,
    pub auth_method: AuthMethod,
    /// bcrypt 哈希，仅本地账户有
    pub secret_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account to be inserted
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub identifier: String,
    pub auth_method: AuthMethod,
    pub secret_hash: Option<String>,
}

/// Account as returned to clients (never carries the hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: i64,
    pub identifier: String,
    pub auth_method: AuthMethod,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            identifier: account.identifier,
            auth_method: account.auth_method,
            created_at: account.created_at,
        }
    }
}
