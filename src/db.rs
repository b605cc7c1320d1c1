// ==========================================
// 教务注册系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供建表脚本与事务辅助函数
// ==========================================

use crate::repository::error::RepositoryError;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::Mutex;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳存储格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 建表脚本
///
/// 说明：
/// - student_load 的 (student_id, term_id, subject_id) 唯一约束是
///   "每个学生每学期每门课至多一条" 的最终保障
/// - prospectus_entry 的唯一索引把空班级当作同一个值处理
/// - 删除班级时级联删除其定向条目，不会留下 "有学年无班级" 的条目
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS department (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS program (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL,
    department_id INTEGER REFERENCES department(id) ON DELETE RESTRICT,
    program_adviser TEXT NOT NULL DEFAULT '',
    school_dean TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS academic_term (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year_label TEXT NOT NULL,
    semester INTEGER NOT NULL CHECK (semester IN (1, 2, 3)),
    is_active INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (year_label, semester)
);

CREATE TABLE IF NOT EXISTS section (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    program_id INTEGER NOT NULL REFERENCES program(id) ON DELETE RESTRICT,
    year_level INTEGER NOT NULL,
    semester INTEGER NOT NULL DEFAULT 1 CHECK (semester IN (1, 2, 3)),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS subject (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    units TEXT NOT NULL DEFAULT '0',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS prospectus_entry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    program_id INTEGER NOT NULL REFERENCES program(id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES subject(id) ON DELETE RESTRICT,
    year_level INTEGER NOT NULL,
    semester INTEGER NOT NULL CHECK (semester IN (1, 2, 3)),
    academic_year TEXT NOT NULL DEFAULT '',
    section_id INTEGER REFERENCES section(id) ON DELETE CASCADE,
    prerequisite_id INTEGER REFERENCES subject(id) ON DELETE RESTRICT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_prospectus_entry_mapping ON prospectus_entry (
    program_id, subject_id, year_level, semester, academic_year, COALESCE(section_id, 0)
);

CREATE INDEX IF NOT EXISTS ix_prospectus_entry_lookup
    ON prospectus_entry (program_id, year_level, semester, academic_year, section_id);

CREATE TABLE IF NOT EXISTS student (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    middle_name TEXT NOT NULL DEFAULT '',
    program_id INTEGER NOT NULL REFERENCES program(id) ON DELETE RESTRICT,
    section_id INTEGER REFERENCES section(id) ON DELETE RESTRICT,
    year_level INTEGER NOT NULL DEFAULT 1,
    academic_year TEXT NOT NULL DEFAULT '',
    semester INTEGER CHECK (semester IS NULL OR semester IN (1, 2, 3)),
    subject_load_schedule TEXT NOT NULL DEFAULT '',
    adviser_name TEXT NOT NULL DEFAULT '',
    adviser_approval_status TEXT NOT NULL DEFAULT 'pending',
    dean_name TEXT NOT NULL DEFAULT '',
    dean_approval_status TEXT NOT NULL DEFAULT 'pending',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS student_load (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES student(id) ON DELETE CASCADE,
    term_id INTEGER NOT NULL REFERENCES academic_term(id) ON DELETE RESTRICT,
    subject_id INTEGER NOT NULL REFERENCES subject(id) ON DELETE RESTRICT,
    status TEXT NOT NULL DEFAULT 'enrolled',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (student_id, term_id, subject_id)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 在单个事务中执行闭包
///
/// 闭包返回 Err 时事务随 Transaction drop 回滚，不留下部分写入。
pub fn with_transaction<T, E, F>(conn: &Mutex<Connection>, f: F) -> Result<T, E>
where
    E: From<RepositoryError>,
    F: FnOnce(&Transaction) -> Result<T, E>,
{
    let mut guard = conn
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))?;
    let tx = guard
        .transaction()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    let value = f(&tx)?;

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
    Ok(value)
}
