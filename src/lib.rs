// ==========================================
// 教务注册系统 - 核心库
// ==========================================
// 功能: 课表解析、升级与自动选课、双签审批定稿
// 存储: SQLite（rusqlite）
// ==========================================

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod importer;
pub mod logging;
pub mod repository;

// 重导出常用类型
pub use app::{get_default_db_path, AppState};
pub use config::{ConfigManager, EngineConfig};
pub use domain::types::{ApprovalStatus, LoadStatus, LoadTermMatch, Semester};
pub use engine::{EngineError, ResolvedSchedule, ScheduleContext, ScheduleResolver, ScheduleSource};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "教务注册系统";
