// ==========================================
// 教务注册系统 - 配置层
// ==========================================
// 职责: 引擎行为开关，支持运行时覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, parse_engine_config, ConfigManager, EngineConfig};
