// ==========================================
// 教务注册系统 - 行字段转换辅助
// ==========================================
// 学期 / 时间戳 等列的统一解析，非法值返回 FromSqlConversionFailure
// ==========================================

use crate::db::TIMESTAMP_FORMAT;
use crate::domain::types::{ApprovalStatus, LoadStatus, Semester};
use chrono::{NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

/// 读取学期列
pub(crate) fn semester_at(row: &Row, idx: usize) -> rusqlite::Result<Semester> {
    let raw: u8 = row.get(idx)?;
    Semester::from_u8(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("无效的学期值: {}", raw).into(),
        )
    })
}

/// 读取可空学期列
pub(crate) fn opt_semester_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Semester>> {
    match row.get::<_, Option<u8>>(idx)? {
        None => Ok(None),
        Some(_) => semester_at(row, idx).map(Some),
    }
}

/// 读取选课状态列
pub(crate) fn load_status_at(row: &Row, idx: usize) -> rusqlite::Result<LoadStatus> {
    let raw: String = row.get(idx)?;
    LoadStatus::from_db_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无效的选课状态: {}", raw).into(),
        )
    })
}

/// 读取审批状态列
pub(crate) fn approval_status_at(row: &Row, idx: usize) -> rusqlite::Result<ApprovalStatus> {
    let raw: String = row.get(idx)?;
    Ok(ApprovalStatus::from_db_str(&raw))
}

/// 读取时间戳列
pub(crate) fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

/// 当前时间（存储格式）
pub(crate) fn now_timestamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}
