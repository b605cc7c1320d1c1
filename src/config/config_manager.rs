// ==========================================
// 教务注册系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// 缺失的键回退默认值；格式错误的值记 warn 后回退默认值
// ==========================================

use crate::domain::types::LoadTermMatch;
use crate::repository::convert::now_timestamp;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 配置键
pub mod config_keys {
    /// 选课记录与学年学期的匹配方式: STRUCTURED / LEGACY_LABEL
    pub const SCHEDULE_LOAD_TERM_MATCH: &str = "schedule/load_term_match";
    /// 升级是否要求目标学期为激活学期
    pub const PROGRESSION_REQUIRE_ACTIVE_TERM: &str = "progression/require_active_term";
    /// 自动选课是否校验先修课
    pub const PROGRESSION_ENFORCE_PREREQUISITES: &str = "progression/enforce_prerequisites";
    /// 最高年级
    pub const PROGRESSION_MAX_YEAR_LEVEL: &str = "progression/max_year_level";
    /// 手工选课是否要求激活学期
    pub const LOAD_REQUIRE_ACTIVE_TERM: &str = "load/require_active_term";
}

/// 配置作用域（当前只使用 global）
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// EngineConfig - 引擎配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub load_term_match: LoadTermMatch,
    pub promotion_requires_active_term: bool,
    pub enforce_prerequisites: bool,
    pub max_year_level: u8,
    pub load_requires_active_term: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            load_term_match: LoadTermMatch::Structured,
            promotion_requires_active_term: true,
            enforce_prerequisites: true,
            max_year_level: 4,
            load_requires_active_term: true,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value, now_timestamp()],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置
    pub fn list_global_config(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取引擎配置快照
    pub fn load_engine_config(&self) -> RepositoryResult<EngineConfig> {
        let values = self.list_global_config()?;
        Ok(parse_engine_config(&values))
    }
}

/// 由键值对构建引擎配置
pub fn parse_engine_config(values: &BTreeMap<String, String>) -> EngineConfig {
    let defaults = EngineConfig::default();

    let load_term_match = match values.get(config_keys::SCHEDULE_LOAD_TERM_MATCH) {
        None => defaults.load_term_match,
        Some(raw) => LoadTermMatch::from_db_str(raw).unwrap_or_else(|| {
            warn!(key = config_keys::SCHEDULE_LOAD_TERM_MATCH, value = %raw, "配置值无效，使用默认值");
            defaults.load_term_match
        }),
    };

    let max_year_level = match values.get(config_keys::PROGRESSION_MAX_YEAR_LEVEL) {
        None => defaults.max_year_level,
        Some(raw) => match raw.trim().parse::<u8>() {
            Ok(v) if v >= 1 => v,
            _ => {
                warn!(key = config_keys::PROGRESSION_MAX_YEAR_LEVEL, value = %raw, "配置值无效，使用默认值");
                defaults.max_year_level
            }
        },
    };

    EngineConfig {
        load_term_match,
        promotion_requires_active_term: parse_flag(
            values,
            config_keys::PROGRESSION_REQUIRE_ACTIVE_TERM,
            defaults.promotion_requires_active_term,
        ),
        enforce_prerequisites: parse_flag(
            values,
            config_keys::PROGRESSION_ENFORCE_PREREQUISITES,
            defaults.enforce_prerequisites,
        ),
        max_year_level,
        load_requires_active_term: parse_flag(
            values,
            config_keys::LOAD_REQUIRE_ACTIVE_TERM,
            defaults.load_requires_active_term,
        ),
    }
}

fn parse_flag(values: &BTreeMap<String, String>, key: &str, default: bool) -> bool {
    match values.get(key) {
        None => default,
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => {
                warn!(key, value = %raw, "配置值无效，使用默认值");
                default
            }
        },
    }
}
