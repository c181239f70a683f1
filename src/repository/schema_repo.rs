//! 表结构管理：建表、删表、连通性检查

use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepoError, SchemaRepository};
use crate::db;

pub struct PgSchemaRepository {
    db: PgPool,
}

impl PgSchemaRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SchemaRepository for PgSchemaRepository {
    async fn init(&self) -> Result<(), RepoError> {
        db::run_migrations(&self.db)
            .await
            .map_err(|e| RepoError::Migration(e.to_string()))
    }

    async fn drop_all(&self) -> Result<(), RepoError> {
        // 同时删除迁移记录，之后 init 可以重新建表
        sqlx::query(
            r#"
            DROP TABLE IF EXISTS
                employee_departments, employees, departments, accounts, _sqlx_migrations
            CASCADE
            "#,
        )
        .execute(&self.db)
        .await?;

        tracing::warn!("All tables dropped");
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
