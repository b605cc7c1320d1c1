use crate::domain::catalog::AcademicTerm;
use crate::domain::types::Semester;
use crate::repository::convert::{now_timestamp, semester_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_TERM: &str = r#"
    SELECT id, year_label, semester, is_active
    FROM academic_term
"#;

fn map_term(row: &Row) -> SqliteResult<AcademicTerm> {
    Ok(AcademicTerm {
        id: row.get(0)?,
        year_label: row.get(1)?,
        semester: semester_at(row, 2)?,
        is_active: row.get(3)?,
    })
}

// ==========================================
// AcademicTermRepository - 学年学期仓储
// ==========================================
// 说明: 模型层不强制"唯一激活学期"，activate_exclusive 为便捷操作
pub struct AcademicTermRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AcademicTermRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建学期（id 由数据库分配，忽略传入值）
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): (year_label, semester) 已存在
    pub fn create(&self, term: &AcademicTerm) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO academic_term (year_label, semester, is_active) VALUES (?1, ?2, ?3)",
            params![term.year_label.trim(), term.semester.as_u8(), term.is_active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<AcademicTerm>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, id)
    }

    pub fn find_by_id_in(conn: &Connection, id: i64) -> RepositoryResult<Option<AcademicTerm>> {
        let sql = format!("{} WHERE id = ?1", SELECT_TERM);
        let term = conn.query_row(&sql, params![id], map_term).optional()?;
        Ok(term)
    }

    pub fn find_by_year_and_semester(
        &self,
        year_label: &str,
        semester: Semester,
    ) -> RepositoryResult<Option<AcademicTerm>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE year_label = ?1 AND semester = ?2", SELECT_TERM);
        let term = conn
            .query_row(&sql, params![year_label, semester.as_u8()], map_term)
            .optional()?;
        Ok(term)
    }

    /// 列出全部学期（学年倒序、学期正序）
    pub fn list_all(&self) -> RepositoryResult<Vec<AcademicTerm>> {
        let conn = self.get_conn()?;
        Self::list_all_in(&conn)
    }

    pub fn list_all_in(conn: &Connection) -> RepositoryResult<Vec<AcademicTerm>> {
        let sql = format!("{} ORDER BY year_label DESC, semester ASC, id ASC", SELECT_TERM);
        let mut stmt = conn.prepare(&sql)?;
        let terms = stmt
            .query_map([], map_term)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(terms)
    }

    pub fn set_active(&self, id: i64, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE academic_term SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_active, now_timestamp(), id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AcademicTerm", id));
        }
        Ok(())
    }

    /// 激活指定学期并停用其他学期（同一事务）
    pub fn activate_exclusive(&self, id: i64) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = now_timestamp();

        let affected = tx.execute(
            "UPDATE academic_term SET is_active = 1, updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AcademicTerm", id));
        }
        tx.execute(
            "UPDATE academic_term SET is_active = 0, updated_at = ?1 WHERE id <> ?2 AND is_active = 1",
            params![now, id],
        )?;

        tx.commit()?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM academic_term WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AcademicTerm", id));
        }
        Ok(())
    }
}
