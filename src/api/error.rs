// ==========================================
// 教务注册系统 - API层错误类型
// ==========================================
// 职责: 将仓储 / 引擎 / 导入错误转换为调用方可读的错误
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("{0}")]
    TermNotFound(String),

    #[error("记录已存在: {0}")]
    Conflict(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::StudentNotFound(id) => ApiError::NotFound(format!("学生(id={})不存在", id)),
            e @ EngineError::TermNotFound { .. } => ApiError::TermNotFound(e.to_string()),
            e @ EngineError::TermNotActive(_) => ApiError::BusinessRuleViolation(e.to_string()),
            e @ EngineError::InvalidYearLevel { .. } => ApiError::InvalidInput(e.to_string()),
            EngineError::ValidationError(msg) => ApiError::ValidationError(msg),
            EngineError::Repository(e) => ApiError::from(e),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => ApiError::from(e),
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件不存在: {}", path)),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Semester;

    #[test]
    fn test_engine_error_mapping() {
        let err = ApiError::from(EngineError::TermNotFound {
            academic_year: "2030-2031".to_string(),
            semester: Semester::First,
        });
        match err {
            ApiError::TermNotFound(msg) => {
                assert!(msg.contains("2030-2031"));
                assert!(msg.contains("Sem 1"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let err = ApiError::from(EngineError::Repository(RepositoryError::not_found("AcademicTerm", 9)));
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = ApiError::from(RepositoryError::UniqueConstraintViolation("dup".to_string()));
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
