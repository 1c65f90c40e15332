//! # 产品目录管理
//!
//! 单一资源 (Product) 的 CRUD 功能，包括：
//! - 服务端资源处理器：列表分页、创建、更新、删除
//! - 客户端页面组件：分页表格 + 新增/编辑弹窗 + 确认删除
//! - 配置、日志、存储等基础设施

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::build_router;
pub use config::Config;
pub use crate::core::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;
