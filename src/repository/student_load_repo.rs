// ==========================================
// 教务注册系统 - 选课记录仓储
// ==========================================
// 表: student_load
// 约束: UNIQUE (student_id, term_id, subject_id)，重复写入返回 UniqueConstraintViolation
// 排序: 视图按 id 升序（创建顺序）
// ==========================================

use crate::domain::student::{StudentLoad, StudentLoadView};
use crate::domain::types::LoadStatus;
use crate::repository::convert::{load_status_at, now_timestamp, semester_at, timestamp_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_load(row: &Row) -> SqliteResult<StudentLoad> {
    Ok(StudentLoad {
        id: row.get(0)?,
        student_pk: row.get(1)?,
        term_id: row.get(2)?,
        subject_id: row.get(3)?,
        status: load_status_at(row, 4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

fn map_view(row: &Row) -> SqliteResult<StudentLoadView> {
    Ok(StudentLoadView {
        id: row.get(0)?,
        status: load_status_at(row, 1)?,
        term_id: row.get(2)?,
        term_year_label: row.get(3)?,
        term_semester: semester_at(row, 4)?,
        subject_id: row.get(5)?,
        subject_code: row.get(6)?,
        subject_title: row.get(7)?,
    })
}

// ==========================================
// StudentLoadRepository - 选课记录仓储
// ==========================================
pub struct StudentLoadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentLoadRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入选课记录
    ///
    /// # 返回
    /// - Ok(id): 新记录 id
    /// - Err(UniqueConstraintViolation): 该学生该学期已有此课程
    pub fn insert(
        &self,
        student_pk: i64,
        term_id: i64,
        subject_id: i64,
        status: LoadStatus,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, student_pk, term_id, subject_id, status)
    }

    pub fn insert_in(
        conn: &Connection,
        student_pk: i64,
        term_id: i64,
        subject_id: i64,
        status: LoadStatus,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO student_load (student_id, term_id, subject_id, status) VALUES (?1, ?2, ?3, ?4)",
            params![student_pk, term_id, subject_id, status.to_db_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StudentLoad>> {
        let conn = self.get_conn()?;
        let load = conn
            .query_row(
                r#"
                SELECT id, student_id, term_id, subject_id, status, created_at, updated_at
                FROM student_load WHERE id = ?1
                "#,
                params![id],
                map_load,
            )
            .optional()?;
        Ok(load)
    }

    /// 学生全部选课视图（按创建顺序）
    pub fn list_views_for_student(&self, student_pk: i64) -> RepositoryResult<Vec<StudentLoadView>> {
        let conn = self.get_conn()?;
        Self::list_views_for_student_in(&conn, student_pk)
    }

    pub fn list_views_for_student_in(
        conn: &Connection,
        student_pk: i64,
    ) -> RepositoryResult<Vec<StudentLoadView>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT l.id, l.status, l.term_id, t.year_label, t.semester,
                   l.subject_id, s.code, s.title
            FROM student_load l
            JOIN academic_term t ON t.id = l.term_id
            JOIN subject s ON s.id = l.subject_id
            WHERE l.student_id = ?1
            ORDER BY l.id ASC
            "#,
        )?;
        let views = stmt
            .query_map(params![student_pk], map_view)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(views)
    }

    /// 统计学生某学期的选课条数
    pub fn count_for_student_term(&self, student_pk: i64, term_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM student_load WHERE student_id = ?1 AND term_id = ?2",
            params![student_pk, term_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn update_status(&self, id: i64, status: LoadStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE student_load SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.to_db_str(), now_timestamp(), id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("StudentLoad", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM student_load WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("StudentLoad", id));
        }
        Ok(())
    }
}
