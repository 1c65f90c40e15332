//! 基础设施层：存储连接、日志

#[cfg(feature = "database")]
pub mod database;
pub mod logger;
