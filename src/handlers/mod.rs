//! HTTP 处理器模块

pub mod assign;
pub mod auth;
pub mod department;
pub mod employee;
pub mod health;
pub mod schema;
