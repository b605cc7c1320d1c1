use crate::domain::catalog::Department;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// DepartmentRepository - 院系仓储
// ==========================================
pub struct DepartmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DepartmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建院系（id 由数据库分配，忽略传入值）
    pub fn create(&self, department: &Department) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO department (code, name) VALUES (?1, ?2)",
            params![department.code, department.name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Department>> {
        let conn = self.get_conn()?;
        let department = conn
            .query_row(
                "SELECT id, code, name FROM department WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Department {
                        id: row.get(0)?,
                        code: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(department)
    }

    /// 按名称排序列出全部院系
    pub fn list_all(&self) -> RepositoryResult<Vec<Department>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, code, name FROM department ORDER BY name, id")?;
        let departments = stmt
            .query_map([], |row| {
                Ok(Department {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(departments)
    }

    pub fn update(&self, department: &Department) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE department SET code = ?1, name = ?2 WHERE id = ?3",
            params![department.code, department.name, department.id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Department", department.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM department WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Department", id));
        }
        Ok(())
    }
}
