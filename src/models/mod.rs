//! 数据模型模块

pub mod account;
pub mod auth;
pub mod department;
pub mod employee;
pub mod paging;
