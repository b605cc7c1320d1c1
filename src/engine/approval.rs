// ==========================================
// 教务注册系统 - 双签审批引擎
// ==========================================
// 职责: 定稿学生课表，导师与院长审批状态同时置为 approved
// 规则:
// - 课表按三层优先级解析（当前选课 → 定向方案 → 模板方案）
// - 签署人: 专业上配置的姓名优先，空白时沿用学生记录中的姓名
// 原子性: 单条 UPDATE，不存在只批准一方的中间状态
// ==========================================

use crate::config::ConfigManager;
use crate::db::with_transaction;
use crate::domain::catalog::SubjectCatalog;
use crate::domain::student::Student;
use crate::domain::types::Semester;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::schedule_resolver::{ResolvedSchedule, ScheduleContext, ScheduleResolver};
use crate::repository::error::RepositoryError;
use crate::repository::{
    ApprovalCommit, ProgramRepository, ProspectusRepository, StudentLoadRepository,
    StudentRepository, SubjectRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// 定稿结果（student 为同一事务内读回的已定稿记录）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub student: Student,
    pub academic_year: String,
    pub semester: Semester,
    pub adviser_name: String,
    pub dean_name: String,
    pub schedule: ResolvedSchedule,
    pub schedule_text: String,
}

/// 签署人姓名: 专业配置非空白则用之，否则用学生已有值
pub fn resolve_signatory(program_value: &str, student_value: &str) -> String {
    if program_value.trim().is_empty() {
        student_value.to_string()
    } else {
        program_value.to_string()
    }
}

// ==========================================
// ApprovalEngine - 审批引擎
// ==========================================
pub struct ApprovalEngine {
    conn: Arc<Mutex<Connection>>,
    config_manager: Arc<ConfigManager>,
}

impl ApprovalEngine {
    pub fn new(conn: Arc<Mutex<Connection>>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            conn,
            config_manager,
        }
    }

    /// 定稿
    ///
    /// # 返回
    /// - Err(StudentNotFound): 学号不存在
    /// - Err(ValidationError): 学年为空
    #[instrument(skip(self))]
    pub fn finalize(
        &self,
        student_id: &str,
        academic_year: &str,
        semester: Semester,
    ) -> EngineResult<FinalizeOutcome> {
        let academic_year = academic_year.trim();
        if academic_year.is_empty() {
            return Err(EngineError::ValidationError("学年不能为空".to_string()));
        }
        let config = self.config_manager.load_engine_config()?;
        let resolver = ScheduleResolver::new(config.load_term_match);

        let outcome = with_transaction(&self.conn, |tx| {
            let student = StudentRepository::find_by_student_id_in(tx, student_id)?
                .ok_or_else(|| EngineError::StudentNotFound(student_id.trim().to_string()))?;
            let program = ProgramRepository::find_by_id_in(tx, student.program_id)?
                .ok_or_else(|| RepositoryError::not_found("Program", student.program_id))?;

            let context = ScheduleContext {
                program_id: student.program_id,
                year_level: student.year_level,
                semester,
                academic_year: academic_year.to_string(),
                section_id: student.section_id,
            };
            let loads = StudentLoadRepository::list_views_for_student_in(tx, student.id)?;
            let entries = ProspectusRepository::list_by_context_in(
                tx,
                student.program_id,
                student.year_level,
                semester,
            )?;
            let catalog =
                SubjectCatalog::new(SubjectRepository::find_for_program_in(tx, student.program_id)?);
            let schedule = resolver.resolve(&context, &loads, &entries, &catalog);

            let commit = ApprovalCommit {
                schedule_text: schedule.render_text(),
                adviser_name: resolve_signatory(&program.program_adviser, &student.adviser_name),
                dean_name: resolve_signatory(&program.school_dean, &student.dean_name),
                academic_year: academic_year.to_string(),
                semester,
            };
            StudentRepository::commit_approval_in(tx, student.id, &commit)?;
            let student = StudentRepository::find_by_pk_in(tx, student.id)?
                .ok_or_else(|| RepositoryError::not_found("Student", student.id))?;

            Ok::<_, EngineError>(FinalizeOutcome {
                student,
                academic_year: commit.academic_year,
                semester,
                adviser_name: commit.adviser_name,
                dean_name: commit.dean_name,
                schedule,
                schedule_text: commit.schedule_text,
            })
        })?;

        info!(
            student_id = %outcome.student.student_id,
            academic_year = %outcome.academic_year,
            semester = %outcome.semester,
            source = ?outcome.schedule.source,
            subjects = outcome.schedule.subjects.len(),
            "审批定稿完成"
        );
        Ok(outcome)
    }
}
