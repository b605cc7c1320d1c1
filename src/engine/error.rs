// ==========================================
// 教务注册系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 解析未命中不是错误（返回空结果）；
//       重复选课在自动选课中按无操作处理，不上抛
// ==========================================

use crate::domain::types::Semester;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("学生不存在: {0}")]
    StudentNotFound(String),

    #[error("学年学期不存在: {academic_year} {semester}，请先创建或激活该学期")]
    TermNotFound {
        academic_year: String,
        semester: Semester,
    },

    #[error("学期未激活: {0}")]
    TermNotActive(String),

    #[error("无效的年级: {value}（允许范围 1..={max}）")]
    InvalidYearLevel { value: u8, max: u8 },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type EngineResult<T> = Result<T, EngineError>;
