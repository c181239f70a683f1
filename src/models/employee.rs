//! Employee models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::department::Department;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// 入职时间
    pub entry_time: DateTime<Utc>,
}

/// Employee with the departments they belong to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeWithDepartments {
    #[serde(flatten)]
    pub employee: Employee,
    pub departments: Vec<Department>,
}

/// Create request; an unknown department is created on the fly
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "department must be 1-100 characters"))]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
}
