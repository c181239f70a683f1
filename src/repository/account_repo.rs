//! Account repository (数据库访问层)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{map_unique_violation, AccountRepository, RepoError};
use crate::models::account::{Account, AuthMethod, NewAccount};

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    identifier: String,
    provider: String,
    secret_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepoError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let auth_method = AuthMethod::from_provider_key(&row.provider)
            .map_err(|e| RepoError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Account {
            id: row.id,
            identifier: row.identifier,
            auth_method,
            secret_hash: row.secret_hash,
            created_at: row.created_at,
        })
    }
}

pub struct PgAccountRepository {
    db: PgPool,
}

impl PgAccountRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &NewAccount) -> Result<Account, RepoError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (identifier, provider, secret_hash)
            VALUES ($1, $2, $3)
            RETURNING id, identifier, provider, secret_hash, created_at
            "#,
        )
        .bind(&account.identifier)
        .bind(account.auth_method.provider_key())
        .bind(&account.secret_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            map_unique_violation(e, || format!("account '{}' already exists", account.identifier))
        })?;

        row.try_into()
    }

    async fn find(
        &self,
        identifier: &str,
        method: AuthMethod,
    ) -> Result<Option<Account>, RepoError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, identifier, provider, secret_hash, created_at
            FROM accounts
            WHERE identifier = $1 AND provider = $2
            "#,
        )
        .bind(identifier)
        .bind(method.provider_key())
        .fetch_optional(&self.db)
        .await?;

        row.map(Account::try_from).transpose()
    }
}
