// ==========================================
// 教务注册系统 - 学年学期匹配
// ==========================================
// 规则: 学年标签与学期均精确相等，不做模糊匹配
// ==========================================

use crate::domain::catalog::AcademicTerm;
use crate::domain::types::Semester;
use crate::engine::error::{EngineError, EngineResult};

/// 按 (学年, 学期) 查找学期记录
///
/// # 返回
/// - Err(TermNotFound): 未找到，提示先创建或激活
pub fn find_term<'a>(
    academic_year: &str,
    semester: Semester,
    terms: &'a [AcademicTerm],
) -> EngineResult<&'a AcademicTerm> {
    let year = academic_year.trim();
    terms
        .iter()
        .find(|t| t.year_label == year && t.semester == semester)
        .ok_or_else(|| EngineError::TermNotFound {
            academic_year: year.to_string(),
            semester,
        })
}

/// 默认选中的学期: id 最小的激活学期
pub fn find_active_term(terms: &[AcademicTerm]) -> Option<&AcademicTerm> {
    terms.iter().filter(|t| t.is_active).min_by_key(|t| t.id)
}
