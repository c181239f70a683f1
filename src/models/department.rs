//! Department models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::employee::Employee;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// Department with its assigned employees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentWithEmployees {
    #[serde(flatten)]
    pub department: Department,
    pub employees: Vec<Employee>,
}

/// Create / rename request
#[derive(Debug, Deserialize, Validate)]
pub struct DepartmentRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
}
