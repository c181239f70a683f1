//! PostgreSQL 仓库层测试
//!
//! 需要可用的数据库（TEST_DATABASE_URL），默认忽略：
//! `cargo test -- --ignored`

use hr_admin::{
    db,
    models::{
        account::{AuthMethod, NewAccount, OAuthProvider},
        paging::Page,
    },
    repository::{RepoError, Repositories},
};
use serial_test::serial;

mod common;
use common::create_test_config;

/// 连接测试库并重建所有表
async fn fresh_repositories() -> Repositories {
    let config = create_test_config();
    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");

    let repos = Repositories::postgres(pool);
    repos.schema.drop_all().await.expect("Failed to drop tables");
    repos.schema.init().await.expect("Failed to run migrations");
    repos
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_account_unique_per_provider() {
    let repos = fresh_repositories().await;

    let local = NewAccount {
        identifier: "alice@example.com".to_string(),
        auth_method: AuthMethod::Local,
        secret_hash: Some("$2b$04$hash".to_string()),
    };
    let created = repos.accounts.create(&local).await.unwrap();
    assert_eq!(created.auth_method, AuthMethod::Local);

    assert!(matches!(
        repos.accounts.create(&local).await,
        Err(RepoError::Conflict(_))
    ));

    let google = NewAccount {
        auth_method: AuthMethod::OAuth(OAuthProvider::Google),
        secret_hash: None,
        ..local.clone()
    };
    repos.accounts.create(&google).await.unwrap();

    let found = repos
        .accounts
        .find("alice@example.com", AuthMethod::OAuth(OAuthProvider::Google))
        .await
        .unwrap()
        .unwrap();
    assert!(found.secret_hash.is_none());

    let local = repos
        .accounts
        .find("alice@example.com", AuthMethod::Local)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(local.id, created.id);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_department_and_employee_associations() {
    let repos = fresh_repositories().await;

    let dev = repos.departments.create("dev").await.unwrap();
    let ops = repos.departments.create("ops").await.unwrap();
    assert!(matches!(
        repos.departments.create("dev").await,
        Err(RepoError::Conflict(_))
    ));

    let kim = repos.employees.create("kim").await.unwrap();
    repos.employees.assign(kim.id, dev.id).await.unwrap();
    repos.employees.assign(kim.id, dev.id).await.unwrap();
    repos.employees.assign(kim.id, ops.id).await.unwrap();

    let listed = repos.departments.list_with_employees(Page::default()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].employees.len(), 1);

    let found = repos.employees.search_by_name("kim").await.unwrap();
    assert_eq!(found[0].departments.len(), 2);

    repos.departments.delete(ops.id).await.unwrap();
    let found = repos.employees.search_by_name("kim").await.unwrap();
    assert_eq!(found[0].departments, vec![dev.clone()]);

    assert!(matches!(
        repos.employees.assign(kim.id, ops.id).await,
        Err(RepoError::NotFound("department"))
    ));

    repos.employees.delete(kim.id).await.unwrap();
    assert!(repos
        .departments
        .employees_of(dev.id, Page::all())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_rename_conflicts_and_missing_rows() {
    let repos = fresh_repositories().await;

    let dev = repos.departments.create("dev").await.unwrap();
    repos.departments.create("ops").await.unwrap();

    assert!(matches!(
        repos.departments.rename(dev.id, "ops").await,
        Err(RepoError::Conflict(_))
    ));
    assert!(matches!(
        repos.departments.rename(-1, "qa").await,
        Err(RepoError::NotFound("department"))
    ));
    assert!(matches!(
        repos.employees.rename(-1, "nobody").await,
        Err(RepoError::NotFound("employee"))
    ));
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_ping() {
    let repos = fresh_repositories().await;
    repos.schema.ping().await.unwrap();
}
