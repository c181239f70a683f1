//! 员工与部门管理

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        department::{Department, DepartmentRequest, DepartmentWithEmployees},
        employee::{CreateEmployeeRequest, Employee, EmployeeWithDepartments, UpdateEmployeeRequest},
        paging::Page,
    },
    repository::{DepartmentRepository, EmployeeRepository, RepoError},
};

pub struct DirectoryService {
    departments: Arc<dyn DepartmentRepository>,
    employees: Arc<dyn EmployeeRepository>,
}

fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|e| AppError::BadRequest(e.to_string()))
}

impl DirectoryService {
    pub fn new(
        departments: Arc<dyn DepartmentRepository>,
        employees: Arc<dyn EmployeeRepository>,
    ) -> Self {
        Self {
            departments,
            employees,
        }
    }

    // ===== 部门 =====

    pub async fn list_departments(
        &self,
        page: Page,
    ) -> Result<Vec<DepartmentWithEmployees>, AppError> {
        Ok(self.departments.list_with_employees(page).await?)
    }

    pub async fn list_departments_only(&self, page: Page) -> Result<Vec<Department>, AppError> {
        Ok(self.departments.list(page).await?)
    }

    pub async fn department_by_name(
        &self,
        name: &str,
    ) -> Result<DepartmentWithEmployees, AppError> {
        let department = self.find_department(name).await?;
        let employees = self.departments.employees_of(department.id, Page::all()).await?;

        Ok(DepartmentWithEmployees {
            department,
            employees,
        })
    }

    pub async fn department_employees(
        &self,
        name: &str,
        page: Page,
    ) -> Result<Vec<Employee>, AppError> {
        let department = self.find_department(name).await?;
        Ok(self.departments.employees_of(department.id, page).await?)
    }

    pub async fn create_department(&self, req: DepartmentRequest) -> Result<Department, AppError> {
        validate(&req)?;

        let department = self.departments.create(&req.name).await?;
        tracing::info!(
            department_id = department.id,
            name = %department.name,
            "Department created"
        );
        Ok(department)
    }

    pub async fn rename_department(
        &self,
        id: i64,
        req: DepartmentRequest,
    ) -> Result<Department, AppError> {
        validate(&req)?;
        Ok(self.departments.rename(id, &req.name).await?)
    }

    pub async fn delete_department(&self, id: i64) -> Result<(), AppError> {
        self.departments.delete(id).await?;
        tracing::info!(department_id = id, "Department deleted");
        Ok(())
    }

    async fn find_department(&self, name: &str) -> Result<Department, AppError> {
        self.departments
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("department '{}' not found", name)))
    }

    // ===== 员工 =====

    pub async fn list_employees(
        &self,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, AppError> {
        Ok(self.employees.list_with_departments(page).await?)
    }

    pub async fn employees_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<EmployeeWithDepartments>, AppError> {
        Ok(self.employees.search_by_name(name).await?)
    }

    /// 最近 `days` 天内入职的员工
    pub async fn employees_joined_within(
        &self,
        days: &str,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, AppError> {
        let days: u32 = days
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("invalid number of days: '{}'", days)))?;

        let since = Utc::now()
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Ok(self.employees.joined_since(since, page).await?)
    }

    /// 新建员工；指定的部门不存在时一并创建
    pub async fn create_employee(
        &self,
        req: CreateEmployeeRequest,
    ) -> Result<EmployeeWithDepartments, AppError> {
        validate(&req)?;

        let department = match req.department.as_deref() {
            Some(name) => Some(self.find_or_create_department(name).await?),
            None => None,
        };

        let employee = self.employees.create(&req.name).await?;

        let departments = match department {
            Some(department) => {
                self.employees.assign(employee.id, department.id).await?;
                vec![department]
            }
            None => Vec::new(),
        };

        tracing::info!(employee_id = employee.id, name = %employee.name, "Employee created");

        Ok(EmployeeWithDepartments {
            employee,
            departments,
        })
    }

    pub async fn rename_employee(
        &self,
        id: i64,
        req: UpdateEmployeeRequest,
    ) -> Result<Employee, AppError> {
        validate(&req)?;
        Ok(self.employees.rename(id, &req.name).await?)
    }

    pub async fn delete_employee(&self, id: i64) -> Result<(), AppError> {
        self.employees.delete(id).await?;
        tracing::info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    async fn find_or_create_department(&self, name: &str) -> Result<Department, AppError> {
        if let Some(department) = self.departments.find_by_name(name).await? {
            return Ok(department);
        }

        match self.departments.create(name).await {
            Ok(department) => Ok(department),
            // 并发请求已经建好了同名部门
            Err(RepoError::Conflict(_)) => self.find_department(name).await,
            Err(e) => Err(e.into()),
        }
    }

    // ===== 关联 =====

    pub async fn assign(&self, employee_id: i64, department_id: i64) -> Result<(), AppError> {
        self.employees.assign(employee_id, department_id).await?;
        tracing::info!(employee_id, department_id, "Employee assigned");
        Ok(())
    }

    pub async fn unassign(&self, employee_id: i64, department_id: i64) -> Result<(), AppError> {
        self.employees.unassign(employee_id, department_id).await?;
        tracing::info!(employee_id, department_id, "Employee unassigned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn service() -> DirectoryService {
        let store = Arc::new(MemoryStore::new());
        DirectoryService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_create_employee_creates_missing_department() {
        let service = service();

        let created = service
            .create_employee(CreateEmployeeRequest {
                name: "kim".to_string(),
                department: Some("research".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.departments.len(), 1);
        assert_eq!(created.departments[0].name, "research");

        let again = service
            .create_employee(CreateEmployeeRequest {
                name: "lee".to_string(),
                department: Some("research".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(again.departments[0].id, created.departments[0].id);

        let research = service.department_by_name("research").await.unwrap();
        assert_eq!(research.employees.len(), 2);
    }

    #[tokio::test]
    async fn test_joined_within_rejects_bad_days() {
        let service = service();

        let err = service.employees_joined_within("soon", Page::default()).await.unwrap_err();
        assert_eq!(err.code(), 400);
        let err = service.employees_joined_within("-1", Page::default()).await.unwrap_err();
        assert_eq!(err.code(), 400);

        assert!(service
            .employees_joined_within("4294967295", Page::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unknown_department_is_not_found() {
        let service = service();
        let err = service.department_employees("nowhere", Page::default()).await.unwrap_err();
        assert_eq!(err.code(), 404);
    }
}
