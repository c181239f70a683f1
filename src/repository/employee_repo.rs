//! Employee repository (数据库访问层)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

use super::{EmployeeRepository, RepoError};
use crate::models::{
    department::Department,
    employee::{Employee, EmployeeWithDepartments},
    paging::Page,
};

#[derive(sqlx::FromRow)]
struct MembershipRow {
    employee_id: i64,
    #[sqlx(flatten)]
    department: Department,
}

pub struct PgEmployeeRepository {
    db: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 为一组员工加载所属部门
    async fn with_departments(
        &self,
        employees: Vec<Employee>,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let ids: Vec<i64> = employees.iter().map(|e| e.id).collect();

        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT ed.employee_id, d.id, d.name
            FROM employee_departments ed
            JOIN departments d ON d.id = ed.department_id
            WHERE ed.employee_id = ANY($1)
            ORDER BY d.id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut memberships: HashMap<i64, Vec<Department>> = HashMap::new();
        for row in rows {
            memberships.entry(row.employee_id).or_default().push(row.department);
        }

        Ok(employees
            .into_iter()
            .map(|employee| EmployeeWithDepartments {
                departments: memberships.remove(&employee.id).unwrap_or_default(),
                employee,
            })
            .collect())
    }

    async fn ensure_pair_exists(
        &self,
        employee_id: i64,
        department_id: i64,
    ) -> Result<(), RepoError> {
        let (employee_exists, department_exists): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM employees WHERE id = $1),
                EXISTS (SELECT 1 FROM departments WHERE id = $2)
            "#,
        )
        .bind(employee_id)
        .bind(department_id)
        .fetch_one(&self.db)
        .await?;

        if !employee_exists {
            return Err(RepoError::NotFound("employee"));
        }
        if !department_exists {
            return Err(RepoError::NotFound("department"));
        }
        Ok(())
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeRepository {
    async fn create(&self, name: &str) -> Result<Employee, RepoError> {
        let employee = sqlx::query_as::<_, Employee>(
            "INSERT INTO employees (name) VALUES ($1) RETURNING id, name, entry_time",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(employee)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, RepoError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, name, entry_time FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(employee)
    }

    async fn list_with_departments(
        &self,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, name, entry_time FROM employees ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        self.with_departments(employees).await
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, name, entry_time FROM employees WHERE name = $1 ORDER BY id ASC",
        )
        .bind(name)
        .fetch_all(&self.db)
        .await?;

        self.with_departments(employees).await
    }

    async fn joined_since(
        &self,
        since: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, entry_time
            FROM employees
            WHERE entry_time >= $1
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(since)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        self.with_departments(employees).await
    }

    async fn rename(&self, id: i64, name: &str) -> Result<Employee, RepoError> {
        sqlx::query_as::<_, Employee>(
            "UPDATE employees SET name = $2 WHERE id = $1 RETURNING id, name, entry_time",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepoError::NotFound("employee"))
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound("employee"));
        }
        Ok(())
    }

    async fn assign(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError> {
        self.ensure_pair_exists(employee_id, department_id).await?;

        sqlx::query(
            r#"
            INSERT INTO employee_departments (employee_id, department_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(employee_id)
        .bind(department_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn unassign(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError> {
        self.ensure_pair_exists(employee_id, department_id).await?;

        sqlx::query(
            "DELETE FROM employee_departments WHERE employee_id = $1 AND department_id = $2",
        )
        .bind(employee_id)
        .bind(department_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
