// ==========================================
// 教务注册系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod prospectus;
pub mod student;
pub mod types;

// 重导出核心类型
pub use catalog::{is_valid_academic_year, term_label, AcademicTerm, Department, Program, Section, Subject, SubjectCatalog};
pub use prospectus::{EntryScope, NewProspectusEntry, ProspectusEntry};
pub use student::{ApprovalState, NewStudent, Student, StudentLoad, StudentLoadView};
pub use types::{ApprovalStatus, LoadStatus, LoadTermMatch, Semester};
