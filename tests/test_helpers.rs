// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、应用状态装配
// ==========================================

#![allow(dead_code)]

use registrar_engine::app::AppState;
use registrar_engine::db::{init_schema, open_sqlite_connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建临时数据库上的 AppState
pub fn create_test_state() -> (NamedTempFile, AppState) {
    registrar_engine::logging::init_test();
    let (temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let state = AppState::new(db_path).expect("初始化AppState失败");
    (temp_file, state)
}
