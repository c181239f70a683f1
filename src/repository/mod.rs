//! Data store layer
//!
//! Each aggregate is behind an async trait with a PostgreSQL backend and an
//! in-memory backend sharing one set of tables.

pub mod account_repo;
pub mod department_repo;
pub mod employee_repo;
pub mod memory;
pub mod schema_repo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    account::{Account, AuthMethod, NewAccount},
    department::{Department, DepartmentWithEmployees},
    employee::{Employee, EmployeeWithDepartments},
    paging::Page,
};

pub use account_repo::PgAccountRepository;
pub use department_repo::PgDepartmentRepository;
pub use employee_repo::PgEmployeeRepository;
pub use memory::MemoryStore;
pub use schema_repo::PgSchemaRepository;

/// Data store errors
#[derive(Debug, Error)]
pub enum RepoError {
    /// Unique constraint violated
    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(String),
}

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// 把唯一约束冲突转换为 Conflict，其余保持原样
pub(crate) fn map_unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> RepoError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return RepoError::Conflict(message());
        }
    }
    RepoError::Database(e)
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert; `Conflict` if (identifier, method) already exists
    async fn create(&self, account: &NewAccount) -> Result<Account, RepoError>;

    async fn find(
        &self,
        identifier: &str,
        method: AuthMethod,
    ) -> Result<Option<Account>, RepoError>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Insert; `Conflict` if the name is taken
    async fn create(&self, name: &str) -> Result<Department, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Department>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, RepoError>;

    async fn list(&self, page: Page) -> Result<Vec<Department>, RepoError>;

    async fn list_with_employees(
        &self,
        page: Page,
    ) -> Result<Vec<DepartmentWithEmployees>, RepoError>;

    /// `NotFound` if absent, `Conflict` if the new name is taken
    async fn rename(&self, id: i64, name: &str) -> Result<Department, RepoError>;

    /// Deletes the department and its assignments
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    async fn employees_of(
        &self,
        department_id: i64,
        page: Page,
    ) -> Result<Vec<Employee>, RepoError>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Employee, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, RepoError>;

    async fn list_with_departments(
        &self,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError>;

    async fn search_by_name(&self, name: &str) -> Result<Vec<EmployeeWithDepartments>, RepoError>;

    /// Employees whose entry time is at or after `since`
    async fn joined_since(
        &self,
        since: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError>;

    async fn rename(&self, id: i64, name: &str) -> Result<Employee, RepoError>;

    /// Deletes the employee and their assignments
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// Idempotent; `NotFound` if either side is missing
    async fn assign(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError>;

    /// `NotFound` if either side is missing
    async fn unassign(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Create all tables (idempotent)
    async fn init(&self) -> Result<(), RepoError>;

    /// Drop all tables
    async fn drop_all(&self) -> Result<(), RepoError>;

    /// Cheap connectivity probe for readiness
    async fn ping(&self) -> Result<(), RepoError>;
}

/// 各仓库的共享句柄
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub schema: Arc<dyn SchemaRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            accounts: Arc::new(PgAccountRepository::new(pool.clone())),
            departments: Arc::new(PgDepartmentRepository::new(pool.clone())),
            employees: Arc::new(PgEmployeeRepository::new(pool.clone())),
            schema: Arc::new(PgSchemaRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            accounts: store.clone(),
            departments: store.clone(),
            employees: store.clone(),
            schema: store,
        }
    }
}
