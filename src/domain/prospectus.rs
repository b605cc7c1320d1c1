// ==========================================
// 教务注册系统 - 培养方案映射 (Prospectus)
// ==========================================
// 一条映射声明: 某专业 / 年级 / 学期 包含某门课程
// - 定向映射: 指定学年 + 班级
// - 模板映射: 学年为空串 + 班级为空
// ==========================================

use crate::domain::types::Semester;
use serde::{Deserialize, Serialize};

// ==========================================
// ProspectusEntry - 培养方案条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProspectusEntry {
    pub id: i64,
    pub program_id: i64,
    pub subject_id: i64,
    pub year_level: u8,
    pub semester: Semester,
    pub academic_year: String,        // 空串 = 模板
    pub section_id: Option<i64>,      // None = 模板
    pub prerequisite_id: Option<i64>, // 先修课程
}

/// 条目作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryScope {
    Scoped,   // 学年 + 班级
    Template, // 两者皆空
    Mixed,    // 只填了其一，解析器不接受
}

impl ProspectusEntry {
    pub fn scope(&self) -> EntryScope {
        let has_year = !self.academic_year.trim().is_empty();
        match (has_year, self.section_id.is_some()) {
            (true, true) => EntryScope::Scoped,
            (false, false) => EntryScope::Template,
            _ => EntryScope::Mixed,
        }
    }

    /// 是否属于 专业 / 年级 / 学期 这一组
    pub fn belongs_to(&self, program_id: i64, year_level: u8, semester: Semester) -> bool {
        self.program_id == program_id && self.year_level == year_level && self.semester == semester
    }
}

/// 新建条目（id 由存储分配）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProspectusEntry {
    pub program_id: i64,
    pub subject_id: i64,
    pub year_level: u8,
    pub semester: Semester,
    pub academic_year: String,
    pub section_id: Option<i64>,
    pub prerequisite_id: Option<i64>,
}

impl NewProspectusEntry {
    pub fn scope(&self) -> EntryScope {
        let has_year = !self.academic_year.trim().is_empty();
        match (has_year, self.section_id.is_some()) {
            (true, true) => EntryScope::Scoped,
            (false, false) => EntryScope::Template,
            _ => EntryScope::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(academic_year: &str, section_id: Option<i64>) -> ProspectusEntry {
        ProspectusEntry {
            id: 1,
            program_id: 1,
            subject_id: 1,
            year_level: 1,
            semester: Semester::First,
            academic_year: academic_year.to_string(),
            section_id,
            prerequisite_id: None,
        }
    }

    #[test]
    fn test_entry_scope() {
        assert_eq!(entry("2024-2025", Some(3)).scope(), EntryScope::Scoped);
        assert_eq!(entry("", None).scope(), EntryScope::Template);
        assert_eq!(entry("2024-2025", None).scope(), EntryScope::Mixed);
        assert_eq!(entry("", Some(3)).scope(), EntryScope::Mixed);
        assert_eq!(entry("   ", None).scope(), EntryScope::Template);
    }
}
