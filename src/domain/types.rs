// ==========================================
// 教务注册系统 - 领域类型定义
// ==========================================
// 职责: 学期、审批状态、选课状态等枚举
// 序列化格式: 与数据库存储一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 学期 (Semester)
// ==========================================
// 存储: 1 / 2 / 3 (3 = 暑期)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    First,  // 第一学期
    Second, // 第二学期
    Summer, // 暑期
}

impl Semester {
    /// 转换为数据库存储值
    pub fn as_u8(&self) -> u8 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
            Semester::Summer => 3,
        }
    }

    /// 从数据库存储值解析
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Semester::First),
            2 => Some(Semester::Second),
            3 => Some(Semester::Summer),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Semester::from_u8(value).ok_or_else(|| format!("无效的学期值: {}", value))
    }
}

impl From<Semester> for u8 {
    fn from(value: Semester) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sem {}", self.as_u8())
    }
}

// ==========================================
// 审批状态 (Approval Status)
// ==========================================
// 导师 / 院长各自独立的一栏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// 从数据库字符串解析（未知值按 pending 处理）
    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => ApprovalStatus::Approved,
            "rejected" => ApprovalStatus::Rejected,
            _ => ApprovalStatus::Pending,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 选课状态 (Load Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Enrolled,  // 在修
    Passed,    // 通过
    Completed, // 已完成
}

impl LoadStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LoadStatus::Enrolled => "enrolled",
            LoadStatus::Passed => "passed",
            LoadStatus::Completed => "completed",
        }
    }

    pub fn from_db_str(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "enrolled" => Some(LoadStatus::Enrolled),
            "passed" => Some(LoadStatus::Passed),
            "completed" => Some(LoadStatus::Completed),
            _ => None,
        }
    }

    /// 是否满足先修课要求
    pub fn satisfies_prerequisite(&self) -> bool {
        matches!(self, LoadStatus::Passed | LoadStatus::Completed)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 选课学期匹配模式 (Load Term Match)
// ==========================================
// STRUCTURED: 学年 + 学期 精确相等
// LEGACY_LABEL: 按 "YYYY-YYYY - Sem N" 显示标签做子串匹配（兼容旧数据）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadTermMatch {
    #[default]
    Structured,
    LegacyLabel,
}

impl LoadTermMatch {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LoadTermMatch::Structured => "STRUCTURED",
            LoadTermMatch::LegacyLabel => "LEGACY_LABEL",
        }
    }

    pub fn from_db_str(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "STRUCTURED" => Some(LoadTermMatch::Structured),
            "LEGACY_LABEL" => Some(LoadTermMatch::LegacyLabel),
            _ => None,
        }
    }
}

impl fmt::Display for LoadTermMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_round_trip_and_label() {
        assert_eq!(Semester::from_u8(3), Some(Semester::Summer));
        assert_eq!(Semester::from_u8(0), None);
        assert_eq!(Semester::from_u8(4), None);
        assert_eq!(Semester::Second.to_string(), "Sem 2");
    }

    #[test]
    fn test_semester_serde_as_number() {
        let json = serde_json::to_string(&Semester::First).unwrap();
        assert_eq!(json, "1");
        let parsed: Semester = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Semester::Second);
        assert!(serde_json::from_str::<Semester>("7").is_err());
    }

    #[test]
    fn test_approval_status_unknown_is_pending() {
        assert_eq!(ApprovalStatus::from_db_str("APPROVED"), ApprovalStatus::Approved);
        assert_eq!(ApprovalStatus::from_db_str("garbage"), ApprovalStatus::Pending);
    }

    #[test]
    fn test_load_status_prerequisite() {
        assert!(!LoadStatus::Enrolled.satisfies_prerequisite());
        assert!(LoadStatus::Passed.satisfies_prerequisite());
        assert!(LoadStatus::Completed.satisfies_prerequisite());
        assert_eq!(LoadStatus::from_db_str("dropped"), None);
    }
}
