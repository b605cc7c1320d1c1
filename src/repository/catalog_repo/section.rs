use crate::domain::catalog::Section;
use crate::repository::convert::{now_timestamp, semester_at};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_SECTION: &str = r#"
    SELECT id, name, program_id, year_level, semester
    FROM section
"#;

fn map_section(row: &Row) -> SqliteResult<Section> {
    Ok(Section {
        id: row.get(0)?,
        name: row.get(1)?,
        program_id: row.get(2)?,
        year_level: row.get(3)?,
        semester: semester_at(row, 4)?,
    })
}

// ==========================================
// SectionRepository - 班级仓储
// ==========================================
pub struct SectionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SectionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建班级（id 由数据库分配，忽略传入值）
    pub fn create(&self, section: &Section) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO section (name, program_id, year_level, semester) VALUES (?1, ?2, ?3, ?4)",
            params![
                section.name,
                section.program_id,
                section.year_level,
                section.semester.as_u8(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Section>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, id)
    }

    pub fn find_by_id_in(conn: &Connection, id: i64) -> RepositoryResult<Option<Section>> {
        let sql = format!("{} WHERE id = ?1", SELECT_SECTION);
        let section = conn.query_row(&sql, params![id], map_section).optional()?;
        Ok(section)
    }

    /// 按专业 + 班级名称查询（CSV 导入用）
    pub fn find_by_program_and_name_in(
        conn: &Connection,
        program_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<Section>> {
        let sql = format!(
            "{} WHERE program_id = ?1 AND name = ?2 ORDER BY id LIMIT 1",
            SELECT_SECTION
        );
        let section = conn
            .query_row(&sql, params![program_id, name.trim()], map_section)
            .optional()?;
        Ok(section)
    }

    /// 查询专业下的班级
    pub fn list_by_program(&self, program_id: i64) -> RepositoryResult<Vec<Section>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE program_id = ?1 ORDER BY name, year_level, semester, id",
            SELECT_SECTION
        );
        let mut stmt = conn.prepare(&sql)?;
        let sections = stmt
            .query_map(params![program_id], map_section)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sections)
    }

    pub fn update(&self, section: &Section) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE section
            SET name = ?1, program_id = ?2, year_level = ?3, semester = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                section.name,
                section.program_id,
                section.year_level,
                section.semester.as_u8(),
                now_timestamp(),
                section.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Section", section.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM section WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Section", id));
        }
        Ok(())
    }
}
