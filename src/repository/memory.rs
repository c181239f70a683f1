//! 内存存储
//! 用一把读写锁保护所有表，保证关联操作与增删的一致性

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{
    AccountRepository, DepartmentRepository, EmployeeRepository, RepoError, SchemaRepository,
};
use crate::models::{
    account::{Account, AuthMethod, NewAccount},
    department::{Department, DepartmentWithEmployees},
    employee::{Employee, EmployeeWithDepartments},
    paging::Page,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
    departments: BTreeMap<i64, Department>,
    employees: BTreeMap<i64, Employee>,
    /// (employee_id, department_id)
    assignments: BTreeSet<(i64, i64)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn departments_of(&self, employee_id: i64) -> Vec<Department> {
        self.assignments
            .range((employee_id, i64::MIN)..=(employee_id, i64::MAX))
            .filter_map(|(_, department_id)| self.departments.get(department_id).cloned())
            .collect()
    }

    fn employees_in(&self, department_id: i64) -> impl Iterator<Item = &Employee> + '_ {
        self.employees.values().filter(move |e| {
            self.assignments.contains(&(e.id, department_id))
        })
    }

    fn with_departments(&self, employee: &Employee) -> EmployeeWithDepartments {
        EmployeeWithDepartments {
            employee: employee.clone(),
            departments: self.departments_of(employee.id),
        }
    }

    fn ensure_pair_exists(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError> {
        if !self.employees.contains_key(&employee_id) {
            return Err(RepoError::NotFound("employee"));
        }
        if !self.departments.contains_key(&department_id) {
            return Err(RepoError::NotFound("department"));
        }
        Ok(())
    }

    fn department_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.departments
            .values()
            .any(|d| d.name == name && Some(d.id) != except)
    }
}

fn window<T>(items: impl Iterator<Item = T>, page: Page) -> impl Iterator<Item = T> {
    items
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
}

/// In-memory data store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create(&self, account: &NewAccount) -> Result<Account, RepoError> {
        let mut tables = self.tables.write().await;

        let exists = tables.accounts.values().any(|a| {
            a.identifier == account.identifier && a.auth_method == account.auth_method
        });
        if exists {
            return Err(RepoError::Conflict(format!(
                "account '{}' already exists",
                account.identifier
            )));
        }

        let created = Account {
            id: tables.next_id(),
            identifier: account.identifier.clone(),
            auth_method: account.auth_method,
            secret_hash: account.secret_hash.clone(),
            created_at: Utc::now(),
        };
        tables.accounts.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find(
        &self,
        identifier: &str,
        method: AuthMethod,
    ) -> Result<Option<Account>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|a| a.identifier == identifier && a.auth_method == method)
            .cloned())
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn create(&self, name: &str) -> Result<Department, RepoError> {
        let mut tables = self.tables.write().await;

        if tables.department_name_taken(name, None) {
            return Err(RepoError::Conflict(format!("department '{}' already exists", name)));
        }

        let department = Department {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.departments.insert(department.id, department.clone());

        Ok(department)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Department>, RepoError> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.departments.values().find(|d| d.name == name).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Department>, RepoError> {
        let tables = self.tables.read().await;
        Ok(window(tables.departments.values().cloned(), page).collect())
    }

    async fn list_with_employees(
        &self,
        page: Page,
    ) -> Result<Vec<DepartmentWithEmployees>, RepoError> {
        let tables = self.tables.read().await;
        Ok(window(tables.departments.values(), page)
            .map(|department| DepartmentWithEmployees {
                department: department.clone(),
                employees: tables.employees_in(department.id).cloned().collect(),
            })
            .collect())
    }

    async fn rename(&self, id: i64, name: &str) -> Result<Department, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.departments.contains_key(&id) {
            return Err(RepoError::NotFound("department"));
        }
        if tables.department_name_taken(name, Some(id)) {
            return Err(RepoError::Conflict(format!("department '{}' already exists", name)));
        }

        let department = tables
            .departments
            .get_mut(&id)
            .ok_or(RepoError::NotFound("department"))?;
        department.name = name.to_string();

        Ok(department.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        tables
            .departments
            .remove(&id)
            .ok_or(RepoError::NotFound("department"))?;
        tables.assignments.retain(|(_, department_id)| *department_id != id);

        Ok(())
    }

    async fn employees_of(
        &self,
        department_id: i64,
        page: Page,
    ) -> Result<Vec<Employee>, RepoError> {
        let tables = self.tables.read().await;
        Ok(window(tables.employees_in(department_id).cloned(), page).collect())
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn create(&self, name: &str) -> Result<Employee, RepoError> {
        let mut tables = self.tables.write().await;

        let employee = Employee {
            id: tables.next_id(),
            name: name.to_string(),
            entry_time: Utc::now(),
        };
        tables.employees.insert(employee.id, employee.clone());

        Ok(employee)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, RepoError> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn list_with_departments(
        &self,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let tables = self.tables.read().await;
        Ok(window(tables.employees.values(), page)
            .map(|e| tables.with_departments(e))
            .collect())
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .values()
            .filter(|e| e.name == name)
            .map(|e| tables.with_departments(e))
            .collect())
    }

    async fn joined_since(
        &self,
        since: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<EmployeeWithDepartments>, RepoError> {
        let tables = self.tables.read().await;
        let joined = tables.employees.values().filter(|e| e.entry_time >= since);
        Ok(window(joined, page)
            .map(|e| tables.with_departments(e))
            .collect())
    }

    async fn rename(&self, id: i64, name: &str) -> Result<Employee, RepoError> {
        let mut tables = self.tables.write().await;

        let employee = tables
            .employees
            .get_mut(&id)
            .ok_or(RepoError::NotFound("employee"))?;
        employee.name = name.to_string();

        Ok(employee.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;

        tables
            .employees
            .remove(&id)
            .ok_or(RepoError::NotFound("employee"))?;
        tables.assignments.retain(|(employee_id, _)| *employee_id != id);

        Ok(())
    }

    async fn assign(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.ensure_pair_exists(employee_id, department_id)?;
        tables.assignments.insert((employee_id, department_id));
        Ok(())
    }

    async fn unassign(&self, employee_id: i64, department_id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.ensure_pair_exists(employee_id, department_id)?;
        tables.assignments.remove(&(employee_id, department_id));
        Ok(())
    }
}

#[async_trait]
impl SchemaRepository for MemoryStore {
    async fn init(&self) -> Result<(), RepoError> {
        Ok(())
    }

    async fn drop_all(&self) -> Result<(), RepoError> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store() -> (
        Arc<dyn DepartmentRepository>,
        Arc<dyn EmployeeRepository>,
        Arc<dyn AccountRepository>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let departments: Arc<dyn DepartmentRepository> = store.clone();
        let employees: Arc<dyn EmployeeRepository> = store.clone();
        let accounts: Arc<dyn AccountRepository> = store;
        (departments, employees, accounts)
    }

    #[tokio::test]
    async fn test_account_uniqueness_is_per_method() {
        let (_, _, accounts) = store();

        let local = NewAccount {
            identifier: "alice@example.com".to_string(),
            auth_method: AuthMethod::Local,
            secret_hash: Some("hash".to_string()),
        };
        accounts.create(&local).await.unwrap();
        assert!(matches!(
            accounts.create(&local).await,
            Err(RepoError::Conflict(_))
        ));

        let google = NewAccount {
            auth_method: AuthMethod::OAuth(crate::models::account::OAuthProvider::Google),
            secret_hash: None,
            ..local.clone()
        };
        accounts.create(&google).await.unwrap();

        let found = accounts
            .find("alice@example.com", AuthMethod::Local)
            .await
            .unwrap()
            .unwrap();
        assert!(found.secret_hash.is_some());
        let found = accounts
            .find("alice@example.com", google.auth_method)
            .await
            .unwrap()
            .unwrap();
        assert!(found.secret_hash.is_none());
    }

    #[tokio::test]
    async fn test_assignment_lifecycle() {
        let (departments, employees, _) = store();

        let dev = departments.create("dev").await.unwrap();
        let ops = departments.create("ops").await.unwrap();
        let kim = employees.create("kim").await.unwrap();

        employees.assign(kim.id, dev.id).await.unwrap();
        employees.assign(kim.id, dev.id).await.unwrap();
        employees.assign(kim.id, ops.id).await.unwrap();

        let found = employees.search_by_name("kim").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].departments, vec![dev.clone(), ops.clone()]);

        departments.delete(ops.id).await.unwrap();
        let found = employees.search_by_name("kim").await.unwrap();
        assert_eq!(found[0].departments, vec![dev.clone()]);

        employees.unassign(kim.id, dev.id).await.unwrap();
        assert!(departments
            .employees_of(dev.id, Page::all())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_assign_missing_side() {
        let (departments, employees, _) = store();
        let dev = departments.create("dev").await.unwrap();

        assert!(matches!(
            employees.assign(999, dev.id).await,
            Err(RepoError::NotFound("employee"))
        ));

        let kim = employees.create("kim").await.unwrap();
        assert!(matches!(
            employees.assign(kim.id, 999).await,
            Err(RepoError::NotFound("department"))
        ));
    }

    #[tokio::test]
    async fn test_department_rename_conflict() {
        let (departments, _, _) = store();
        let dev = departments.create("dev").await.unwrap();
        departments.create("ops").await.unwrap();

        assert!(matches!(
            departments.rename(dev.id, "ops").await,
            Err(RepoError::Conflict(_))
        ));
        assert_eq!(departments.rename(dev.id, "dev").await.unwrap().name, "dev");
        assert!(matches!(
            departments.rename(999, "qa").await,
            Err(RepoError::NotFound("department"))
        ));
    }

    #[tokio::test]
    async fn test_paging_window() {
        let (departments, _, _) = store();
        for i in 0..5 {
            departments.create(&format!("d{}", i)).await.unwrap();
        }

        let page = departments.list(Page { limit: 2, offset: 2 }).await.unwrap();
        let names: Vec<_> = page.into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["d2", "d3"]);
    }
}
