// ==========================================
// 教务注册系统 - 目录领域模型
// ==========================================
// 包含: 院系 / 专业 / 班级 / 学年学期 / 课程
// 归属: 由后台 CRUD 维护，引擎只读
// ==========================================

use crate::domain::types::Semester;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Department - 院系
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub code: String,
    pub name: String,
}

// ==========================================
// Program - 专业
// ==========================================
// program_adviser / school_dean 为空字符串表示未配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub department_id: Option<i64>,
    pub program_adviser: String, // 专业导师
    pub school_dean: String,     // 学院院长
}

// ==========================================
// Section - 班级
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub program_id: i64,
    pub year_level: u8,
    pub semester: Semester,
}

// ==========================================
// AcademicTerm - 学年学期
// ==========================================
// 约束: (year_label, semester) 在存储层唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicTerm {
    pub id: i64,
    pub year_label: String, // "YYYY-YYYY"
    pub semester: Semester,
    pub is_active: bool,
}

impl AcademicTerm {
    /// 显示标签，例如 "2024-2025 - Sem 1"
    pub fn label(&self) -> String {
        term_label(&self.year_label, self.semester)
    }
}

/// 学期显示标签
pub fn term_label(year_label: &str, semester: Semester) -> String {
    format!("{} - {}", year_label, semester)
}

/// 学年标签格式: "YYYY-YYYY"，后一年 = 前一年 + 1
pub fn is_valid_academic_year(value: &str) -> bool {
    let Some((start, end)) = value.trim().split_once('-') else {
        return false;
    };
    let is_year = |part: &str| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit());
    if !is_year(start) || !is_year(end) {
        return false;
    }
    match (start.parse::<u16>(), end.parse::<u16>()) {
        (Ok(s), Ok(e)) => e == s + 1,
        _ => false,
    }
}

// ==========================================
// Subject - 课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub units: String, // 学分，十进制字符串
}

// ==========================================
// SubjectCatalog - 课程查找表
// ==========================================
/// 按 id 查找课程，供课表解析使用
#[derive(Debug, Clone, Default)]
pub struct SubjectCatalog {
    by_id: HashMap<i64, Subject>,
}

impl SubjectCatalog {
    pub fn new(subjects: impl IntoIterator<Item = Subject>) -> Self {
        Self {
            by_id: subjects.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    pub fn get(&self, subject_id: i64) -> Option<&Subject> {
        self.by_id.get(&subject_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_academic_year_format() {
        assert!(is_valid_academic_year("2024-2025"));
        assert!(is_valid_academic_year(" 2024-2025 "));
        assert!(!is_valid_academic_year("2024-2026"));
        assert!(!is_valid_academic_year("2024"));
        assert!(!is_valid_academic_year("24-25"));
        assert!(!is_valid_academic_year("abcd-abce"));
        assert!(!is_valid_academic_year(""));
    }

    #[test]
    fn test_term_label() {
        assert_eq!(term_label("2024-2025", Semester::Summer), "2024-2025 - Sem 3");
    }
}
