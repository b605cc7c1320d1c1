// ==========================================
// 教务注册系统 - 学生仓储
// ==========================================
// 表: student
// 说明: 学籍进度与审批字段的写入只在引擎事务内通过 *_in 方法完成
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::student::{NewStudent, Student};
use crate::domain::types::{ApprovalStatus, Semester};
use crate::repository::convert::{
    approval_status_at, now_timestamp, opt_semester_at, timestamp_at,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const SELECT_STUDENT: &str = r#"
    SELECT id, student_id, first_name, last_name, middle_name,
           program_id, section_id, year_level, academic_year, semester,
           subject_load_schedule, adviser_name, adviser_approval_status,
           dean_name, dean_approval_status, is_active, created_at, updated_at
    FROM student
"#;

fn map_student(row: &Row) -> SqliteResult<Student> {
    Ok(Student {
        id: row.get(0)?,
        student_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        middle_name: row.get(4)?,
        program_id: row.get(5)?,
        section_id: row.get(6)?,
        year_level: row.get(7)?,
        academic_year: row.get(8)?,
        semester: opt_semester_at(row, 9)?,
        subject_load_schedule: row.get(10)?,
        adviser_name: row.get(11)?,
        adviser_approval_status: approval_status_at(row, 12)?,
        dean_name: row.get(13)?,
        dean_approval_status: approval_status_at(row, 14)?,
        is_active: row.get(15)?,
        created_at: timestamp_at(row, 16)?,
        updated_at: timestamp_at(row, 17)?,
    })
}

/// 学籍进度修改（继续就读页面的"保存修改"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionUpdate {
    pub program_id: i64,
    pub section_id: Option<i64>,
    pub year_level: u8,
    pub academic_year: String,
    pub semester: Option<Semester>,
}

/// 审批定稿写入内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalCommit {
    pub schedule_text: String,
    pub adviser_name: String,
    pub dean_name: String,
    pub academic_year: String,
    pub semester: Semester,
}

// ==========================================
// StudentRepository - 学生仓储
// ==========================================
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 注册学生，审批状态初始为 pending
    ///
    /// # 返回
    /// - Ok(id): 内部主键
    /// - Err(UniqueConstraintViolation): 学号已存在
    pub fn create(&self, student: &NewStudent) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO student (
                student_id, first_name, last_name, middle_name,
                program_id, section_id, year_level, academic_year, semester,
                adviser_name, adviser_approval_status, dean_name, dean_approval_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                student.student_id.trim(),
                student.first_name,
                student.last_name,
                student.middle_name,
                student.program_id,
                student.section_id,
                student.year_level,
                student.academic_year.trim(),
                student.semester.map(|s| s.as_u8()),
                student.adviser_name,
                ApprovalStatus::Pending.to_db_str(),
                student.dean_name,
                ApprovalStatus::Pending.to_db_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按学号查询（含已停用学生）
    pub fn find_by_student_id(&self, student_id: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        Self::find_by_student_id_in(&conn, student_id)
    }

    pub fn find_by_student_id_in(
        conn: &Connection,
        student_id: &str,
    ) -> RepositoryResult<Option<Student>> {
        let sql = format!("{} WHERE student_id = ?1", SELECT_STUDENT);
        let student = conn
            .query_row(&sql, params![student_id.trim()], map_student)
            .optional()?;
        Ok(student)
    }

    pub fn find_by_pk_in(conn: &Connection, id: i64) -> RepositoryResult<Option<Student>> {
        let sql = format!("{} WHERE id = ?1", SELECT_STUDENT);
        let student = conn.query_row(&sql, params![id], map_student).optional()?;
        Ok(student)
    }

    /// 列出在读学生
    pub fn list_active(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE is_active = 1 ORDER BY student_id", SELECT_STUDENT);
        let mut stmt = conn.prepare(&sql)?;
        let students = stmt
            .query_map([], map_student)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(students)
    }

    /// 修改学籍进度字段
    pub fn update_progression(
        &self,
        student_id: &str,
        update: &ProgressionUpdate,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE student
            SET program_id = ?1, section_id = ?2, year_level = ?3,
                academic_year = ?4, semester = ?5, updated_at = ?6
            WHERE student_id = ?7
            "#,
            params![
                update.program_id,
                update.section_id,
                update.year_level,
                update.academic_year.trim(),
                update.semester.map(|s| s.as_u8()),
                now_timestamp(),
                student_id.trim(),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", student_id));
        }
        Ok(())
    }

    /// 修改年级（升级事务内调用）
    pub fn update_year_level_in(conn: &Connection, id: i64, year_level: u8) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE student SET year_level = ?1, updated_at = ?2 WHERE id = ?3",
            params![year_level, now_timestamp(), id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", id));
        }
        Ok(())
    }

    /// 写入审批定稿：两栏同时置为 approved，单条 UPDATE
    pub fn commit_approval_in(
        conn: &Connection,
        id: i64,
        commit: &ApprovalCommit,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE student
            SET adviser_name = ?1, adviser_approval_status = ?2,
                dean_name = ?3, dean_approval_status = ?4,
                subject_load_schedule = ?5,
                academic_year = ?6, semester = ?7,
                updated_at = ?8
            WHERE id = ?9
            "#,
            params![
                commit.adviser_name,
                ApprovalStatus::Approved.to_db_str(),
                commit.dean_name,
                ApprovalStatus::Approved.to_db_str(),
                commit.schedule_text,
                commit.academic_year.trim(),
                commit.semester.as_u8(),
                now_timestamp(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", id));
        }
        Ok(())
    }

    /// 软删除（停用）
    pub fn soft_delete(&self, student_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE student SET is_active = 0, updated_at = ?1 WHERE student_id = ?2",
            params![now_timestamp(), student_id.trim()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Student", student_id));
        }
        Ok(())
    }
}
