// ==========================================
// 教务注册系统 - 学生与选课领域模型
// ==========================================
// 学生的学籍字段 (专业/年级/学年/学期/班级) 在注册时写入，
// 之后只由升级引擎与审批流程修改
// ==========================================

use crate::domain::catalog::term_label;
use crate::domain::types::{ApprovalStatus, LoadStatus, Semester};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Student - 学生
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    // ===== 标识 =====
    pub id: i64,            // 内部主键
    pub student_id: String, // 对外学号

    // ===== 基本信息 =====
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,

    // ===== 学籍进度 =====
    pub program_id: i64,
    pub section_id: Option<i64>,
    pub year_level: u8,
    pub academic_year: String,
    pub semester: Option<Semester>,

    // ===== 审批 =====
    pub subject_load_schedule: String, // 定稿课表文本
    pub adviser_name: String,
    pub adviser_approval_status: ApprovalStatus,
    pub dean_name: String,
    pub dean_approval_status: ApprovalStatus,

    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Student {
    pub fn approval_state(&self) -> ApprovalState {
        ApprovalState {
            adviser: self.adviser_approval_status,
            dean: self.dean_approval_status,
        }
    }
}

/// 注册新学生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub program_id: i64,
    pub section_id: Option<i64>,
    pub year_level: u8,
    pub academic_year: String,
    pub semester: Option<Semester>,
    pub adviser_name: String,
    pub dean_name: String,
}

// ==========================================
// ApprovalState - 双方审批状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalState {
    pub adviser: ApprovalStatus,
    pub dean: ApprovalStatus,
}

impl ApprovalState {
    /// 导师与院长均已批准
    pub fn is_finalized(&self) -> bool {
        self.adviser == ApprovalStatus::Approved && self.dean == ApprovalStatus::Approved
    }
}

// ==========================================
// StudentLoad - 选课记录
// ==========================================
// 约束: (student, term, subject) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLoad {
    pub id: i64,
    pub student_pk: i64, // 学生内部主键
    pub term_id: i64,
    pub subject_id: i64,
    pub status: LoadStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// StudentLoadView - 选课展示视图（冗余学期/课程信息）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLoadView {
    pub id: i64,
    pub status: LoadStatus,
    pub term_id: i64,
    pub term_year_label: String,
    pub term_semester: Semester,
    pub subject_id: i64,
    pub subject_code: String,
    pub subject_title: String,
}

impl StudentLoadView {
    pub fn term_label(&self) -> String {
        term_label(&self.term_year_label, self.term_semester)
    }
}
