use crate::domain::catalog::Program;
use crate::repository::convert::now_timestamp;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_PROGRAM: &str = r#"
    SELECT id, code, name, department_id, program_adviser, school_dean
    FROM program
"#;

fn map_program(row: &Row) -> SqliteResult<Program> {
    Ok(Program {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        department_id: row.get(3)?,
        program_adviser: row.get(4)?,
        school_dean: row.get(5)?,
    })
}

// ==========================================
// ProgramRepository - 专业仓储
// ==========================================
pub struct ProgramRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgramRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建专业（id 由数据库分配，忽略传入值）
    pub fn create(&self, program: &Program) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO program (code, name, department_id, program_adviser, school_dean)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                program.code,
                program.name,
                program.department_id,
                program.program_adviser,
                program.school_dean,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, id)
    }

    /// 在已持有的连接/事务上查询
    pub fn find_by_id_in(conn: &Connection, id: i64) -> RepositoryResult<Option<Program>> {
        let sql = format!("{} WHERE id = ?1", SELECT_PROGRAM);
        let program = conn.query_row(&sql, params![id], map_program).optional()?;
        Ok(program)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        Self::find_by_code_in(&conn, code)
    }

    pub fn find_by_code_in(conn: &Connection, code: &str) -> RepositoryResult<Option<Program>> {
        let sql = format!("{} WHERE code = ?1 ORDER BY id LIMIT 1", SELECT_PROGRAM);
        let program = conn.query_row(&sql, params![code.trim()], map_program).optional()?;
        Ok(program)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Program>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY name, id", SELECT_PROGRAM);
        let mut stmt = conn.prepare(&sql)?;
        let programs = stmt
            .query_map([], map_program)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(programs)
    }

    pub fn update(&self, program: &Program) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE program
            SET code = ?1, name = ?2, department_id = ?3,
                program_adviser = ?4, school_dean = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
            params![
                program.code,
                program.name,
                program.department_id,
                program.program_adviser,
                program.school_dean,
                now_timestamp(),
                program.id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Program", program.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM program WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Program", id));
        }
        Ok(())
    }
}
