//! Department repository (数据库访问层)

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use super::{map_unique_violation, DepartmentRepository, RepoError};
use crate::models::{
    department::{Department, DepartmentWithEmployees},
    employee::Employee,
    paging::Page,
};

#[derive(sqlx::FromRow)]
struct MemberRow {
    department_id: i64,
    #[sqlx(flatten)]
    employee: Employee,
}

pub struct PgDepartmentRepository {
    db: PgPool,
}

impl PgDepartmentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn create(&self, name: &str) -> Result<Department, RepoError> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, || format!("department '{}' already exists", name)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Department>, RepoError> {
        let department =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(department)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, RepoError> {
        let department =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.db)
                .await?;

        Ok(department)
    }

    async fn list(&self, page: Page) -> Result<Vec<Department>, RepoError> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, name FROM departments ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(departments)
    }

    async fn list_with_employees(
        &self,
        page: Page,
    ) -> Result<Vec<DepartmentWithEmployees>, RepoError> {
        let departments = self.list(page).await?;
        let ids: Vec<i64> = departments.iter().map(|d| d.id).collect();

        // 一次查询取出本页所有部门的成员
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT ed.department_id, e.id, e.name, e.entry_time
            FROM employee_departments ed
            JOIN employees e ON e.id = ed.employee_id
            WHERE ed.department_id = ANY($1)
            ORDER BY e.id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut members: HashMap<i64, Vec<Employee>> = HashMap::new();
        for row in rows {
            members.entry(row.department_id).or_default().push(row.employee);
        }

        Ok(departments
            .into_iter()
            .map(|department| DepartmentWithEmployees {
                employees: members.remove(&department.id).unwrap_or_default(),
                department,
            })
            .collect())
    }

    async fn rename(&self, id: i64, name: &str) -> Result<Department, RepoError> {
        sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, || format!("department '{}' already exists", name)))?
        .ok_or(RepoError::NotFound("department"))
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        // 关联记录由 ON DELETE CASCADE 清理
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound("department"));
        }
        Ok(())
    }

    async fn employees_of(
        &self,
        department_id: i64,
        page: Page,
    ) -> Result<Vec<Employee>, RepoError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id, e.name, e.entry_time
            FROM employees e
            JOIN employee_departments ed ON ed.employee_id = e.id
            WHERE ed.department_id = $1
            ORDER BY e.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(department_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(employees)
    }
}
