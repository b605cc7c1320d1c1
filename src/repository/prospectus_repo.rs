// ==========================================
// 教务注册系统 - 培养方案映射仓储
// ==========================================
// 表: prospectus_entry
// 排序: 统一按 id 升序（插入顺序），保证课表解析结果确定
// 红线: Repository 不含业务逻辑（仅 update 守住作用域，其余校验在 API 层）
// ==========================================

use crate::domain::prospectus::{EntryScope, NewProspectusEntry, ProspectusEntry};
use crate::domain::types::Semester;
use crate::repository::convert::semester_at;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_ENTRY: &str = r#"
    SELECT id, program_id, subject_id, year_level, semester,
           academic_year, section_id, prerequisite_id
    FROM prospectus_entry
"#;

fn map_entry(row: &Row) -> SqliteResult<ProspectusEntry> {
    Ok(ProspectusEntry {
        id: row.get(0)?,
        program_id: row.get(1)?,
        subject_id: row.get(2)?,
        year_level: row.get(3)?,
        semester: semester_at(row, 4)?,
        academic_year: row.get(5)?,
        section_id: row.get(6)?,
        prerequisite_id: row.get(7)?,
    })
}

// ==========================================
// ProspectusRepository - 培养方案仓储
// ==========================================
pub struct ProspectusRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProspectusRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建条目
    ///
    /// # 返回
    /// - Ok(id): 新条目 id
    /// - Err(UniqueConstraintViolation): 同一映射已存在
    pub fn create(&self, entry: &NewProspectusEntry) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::create_in(&conn, entry)
    }

    pub fn create_in(conn: &Connection, entry: &NewProspectusEntry) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO prospectus_entry (
                program_id, subject_id, year_level, semester,
                academic_year, section_id, prerequisite_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.program_id,
                entry.subject_id,
                entry.year_level,
                entry.semester.as_u8(),
                entry.academic_year.trim(),
                entry.section_id,
                entry.prerequisite_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProspectusEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_ENTRY);
        let entry = conn.query_row(&sql, params![id], map_entry).optional()?;
        Ok(entry)
    }

    /// 查询专业的全部条目
    pub fn list_by_program(&self, program_id: i64) -> RepositoryResult<Vec<ProspectusEntry>> {
        let conn = self.get_conn()?;
        Self::list_by_program_in(&conn, program_id)
    }

    pub fn list_by_program_in(
        conn: &Connection,
        program_id: i64,
    ) -> RepositoryResult<Vec<ProspectusEntry>> {
        let sql = format!("{} WHERE program_id = ?1 ORDER BY id ASC", SELECT_ENTRY);
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![program_id], map_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// 查询 专业 / 年级 / 学期 下的全部条目（含定向与模板）
    pub fn list_by_context(
        &self,
        program_id: i64,
        year_level: u8,
        semester: Semester,
    ) -> RepositoryResult<Vec<ProspectusEntry>> {
        let conn = self.get_conn()?;
        Self::list_by_context_in(&conn, program_id, year_level, semester)
    }

    pub fn list_by_context_in(
        conn: &Connection,
        program_id: i64,
        year_level: u8,
        semester: Semester,
    ) -> RepositoryResult<Vec<ProspectusEntry>> {
        let sql = format!(
            "{} WHERE program_id = ?1 AND year_level = ?2 AND semester = ?3 ORDER BY id ASC",
            SELECT_ENTRY
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![program_id, year_level, semester.as_u8()], map_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// 整体替换条目映射（id 不变）
    ///
    /// # 返回
    /// - Err(ValidationError): 学年与班级只给了其一
    pub fn update(&self, id: i64, entry: &NewProspectusEntry) -> RepositoryResult<()> {
        if entry.scope() == EntryScope::Mixed {
            return Err(RepositoryError::ValidationError(format!(
                "培养方案条目(id={})的学年与班级必须同时填写或同时为空",
                id
            )));
        }
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE prospectus_entry
            SET program_id = ?1, subject_id = ?2, year_level = ?3, semester = ?4,
                academic_year = ?5, section_id = ?6, prerequisite_id = ?7
            WHERE id = ?8
            "#,
            params![
                entry.program_id,
                entry.subject_id,
                entry.year_level,
                entry.semester.as_u8(),
                entry.academic_year.trim(),
                entry.section_id,
                entry.prerequisite_id,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ProspectusEntry", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM prospectus_entry WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ProspectusEntry", id));
        }
        Ok(())
    }
}
