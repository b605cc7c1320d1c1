use crate::domain::catalog::Subject;
use crate::repository::convert::now_timestamp;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_SUBJECT: &str = "SELECT id, code, title, units FROM subject";

fn map_subject(row: &Row) -> SqliteResult<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        code: row.get(1)?,
        title: row.get(2)?,
        units: row.get(3)?,
    })
}

// ==========================================
// SubjectRepository - 课程仓储
// ==========================================
pub struct SubjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubjectRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建课程（id 由数据库分配，忽略传入值）
    pub fn create(&self, subject: &Subject) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO subject (code, title, units) VALUES (?1, ?2, ?3)",
            params![subject.code.trim(), subject.title, subject.units],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Subject>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, id)
    }

    pub fn find_by_id_in(conn: &Connection, id: i64) -> RepositoryResult<Option<Subject>> {
        let sql = format!("{} WHERE id = ?1", SELECT_SUBJECT);
        let subject = conn.query_row(&sql, params![id], map_subject).optional()?;
        Ok(subject)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Subject>> {
        let conn = self.get_conn()?;
        Self::find_by_code_in(&conn, code)
    }

    pub fn find_by_code_in(conn: &Connection, code: &str) -> RepositoryResult<Option<Subject>> {
        let sql = format!("{} WHERE code = ?1", SELECT_SUBJECT);
        let subject = conn
            .query_row(&sql, params![code.trim()], map_subject)
            .optional()?;
        Ok(subject)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Subject>> {
        let conn = self.get_conn()?;
        Self::list_all_in(&conn)
    }

    pub fn list_all_in(conn: &Connection) -> RepositoryResult<Vec<Subject>> {
        let sql = format!("{} ORDER BY code", SELECT_SUBJECT);
        let mut stmt = conn.prepare(&sql)?;
        let subjects = stmt
            .query_map([], map_subject)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(subjects)
    }

    /// 查询专业培养方案引用到的课程（含先修课）
    pub fn find_for_program_in(conn: &Connection, program_id: i64) -> RepositoryResult<Vec<Subject>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT s.id, s.code, s.title, s.units
            FROM subject s
            WHERE s.id IN (
                SELECT subject_id FROM prospectus_entry WHERE program_id = ?1
                UNION
                SELECT prerequisite_id FROM prospectus_entry
                WHERE program_id = ?1 AND prerequisite_id IS NOT NULL
            )
            ORDER BY s.code
            "#,
        )?;
        let subjects = stmt
            .query_map(params![program_id], map_subject)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(subjects)
    }

    pub fn update(&self, subject: &Subject) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE subject SET code = ?1, title = ?2, units = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                subject.code.trim(),
                subject.title,
                subject.units,
                now_timestamp(),
                subject.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Subject", subject.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM subject WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Subject", id));
        }
        Ok(())
    }
}
