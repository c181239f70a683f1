//! Business logic services layer

pub mod account_service;
pub mod directory_service;

pub use account_service::AccountService;
pub use directory_service::DirectoryService;
