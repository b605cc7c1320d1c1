// ==========================================
// 教务注册系统 - 课表查询 API
// ==========================================
// 职责: 课表预览（无学生）与学生课表（含当前选课层）
// 红线: 只读，不写入任何记录
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_academic_year, validate_student_id};
use crate::config::ConfigManager;
use crate::domain::catalog::SubjectCatalog;
use crate::domain::types::Semester;
use crate::engine::schedule_resolver::{ResolvedSchedule, ScheduleContext, ScheduleResolver};
use crate::repository::{
    ProspectusRepository, StudentLoadRepository, StudentRepository, SubjectRepository,
};

// ==========================================
// ScheduleApi - 课表查询 API
// ==========================================
pub struct ScheduleApi {
    prospectus_repo: Arc<ProspectusRepository>,
    subject_repo: Arc<SubjectRepository>,
    student_repo: Arc<StudentRepository>,
    load_repo: Arc<StudentLoadRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ScheduleApi {
    pub fn new(
        prospectus_repo: Arc<ProspectusRepository>,
        subject_repo: Arc<SubjectRepository>,
        student_repo: Arc<StudentRepository>,
        load_repo: Arc<StudentLoadRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            prospectus_repo,
            subject_repo,
            student_repo,
            load_repo,
            config_manager,
        }
    }

    fn resolver(&self) -> ApiResult<ScheduleResolver> {
        let config = self.config_manager.load_engine_config()?;
        Ok(ScheduleResolver::new(config.load_term_match))
    }

    /// 课表预览（仅培养方案层）
    ///
    /// # 参数
    /// - academic_year: 可为空（此时只可能命中模板层）
    pub fn preview_schedule(
        &self,
        program_id: i64,
        year_level: u8,
        semester: Semester,
        academic_year: &str,
        section_id: Option<i64>,
    ) -> ApiResult<ResolvedSchedule> {
        let academic_year = if academic_year.trim().is_empty() {
            ""
        } else {
            validate_academic_year(academic_year)?
        };

        let context = ScheduleContext {
            program_id,
            year_level,
            semester,
            academic_year: academic_year.to_string(),
            section_id,
        };
        let entries = self
            .prospectus_repo
            .list_by_context(program_id, year_level, semester)?;
        let catalog = SubjectCatalog::new(self.subject_repo.list_all()?);

        Ok(self.resolver()?.resolve(&context, &[], &entries, &catalog))
    }

    /// 学生课表（当前选课 → 定向方案 → 模板方案）
    pub fn student_schedule(
        &self,
        student_id: &str,
        academic_year: &str,
        semester: Semester,
    ) -> ApiResult<ResolvedSchedule> {
        let student_id = validate_student_id(student_id)?;
        let academic_year = validate_academic_year(academic_year)?;

        let student = self
            .student_repo
            .find_by_student_id(student_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学生(id={})不存在", student_id)))?;

        let context = ScheduleContext {
            program_id: student.program_id,
            year_level: student.year_level,
            semester,
            academic_year: academic_year.to_string(),
            section_id: student.section_id,
        };
        let loads = self.load_repo.list_views_for_student(student.id)?;
        let entries = self
            .prospectus_repo
            .list_by_context(student.program_id, student.year_level, semester)?;
        let catalog = SubjectCatalog::new(self.subject_repo.list_all()?);

        Ok(self.resolver()?.resolve(&context, &loads, &entries, &catalog))
    }
}
