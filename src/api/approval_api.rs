// ==========================================
// 教务注册系统 - 审批 API
// ==========================================
// 职责: 双签定稿、审批状态查询
// 说明: 不提供单方审批入口
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_academic_year, validate_student_id};
use crate::domain::student::ApprovalState;
use crate::domain::types::Semester;
use crate::engine::approval::{ApprovalEngine, FinalizeOutcome};
use crate::repository::StudentRepository;

pub struct ApprovalApi {
    engine: Arc<ApprovalEngine>,
    student_repo: Arc<StudentRepository>,
}

impl ApprovalApi {
    pub fn new(engine: Arc<ApprovalEngine>, student_repo: Arc<StudentRepository>) -> Self {
        Self {
            engine,
            student_repo,
        }
    }

    /// 定稿: 导师与院长同时批准
    pub fn finalize_approval(
        &self,
        student_id: &str,
        academic_year: &str,
        semester: Semester,
    ) -> ApiResult<FinalizeOutcome> {
        let student_id = validate_student_id(student_id)?;
        let academic_year = validate_academic_year(academic_year)?;
        Ok(self.engine.finalize(student_id, academic_year, semester)?)
    }

    pub fn approval_state(&self, student_id: &str) -> ApiResult<ApprovalState> {
        let student_id = validate_student_id(student_id)?;
        let student = self
            .student_repo
            .find_by_student_id(student_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学生(id={})不存在", student_id)))?;
        Ok(student.approval_state())
    }
}
