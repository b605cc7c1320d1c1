// ==========================================
// 教务注册系统 - 手工选课 API
// ==========================================
// 规则（add_load）:
// - 学生须在读，学期须为激活学期（load/require_active_term）
// - 课程须在学生该学期的培养方案中（定向 → 模板）
// - 先修课须已通过（progression/enforce_prerequisites）
// - 重复选课返回 Conflict
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_student_id;
use crate::config::ConfigManager;
use crate::db::with_transaction;
use crate::domain::student::StudentLoadView;
use crate::domain::types::LoadStatus;
use crate::engine::eligibility::PrerequisiteIndex;
use crate::engine::schedule_resolver::{ScheduleContext, ScheduleResolver};
use crate::repository::{
    AcademicTermRepository, ProspectusRepository, StudentLoadRepository, StudentRepository,
    SubjectRepository,
};

pub struct LoadApi {
    conn: Arc<Mutex<Connection>>,
    load_repo: Arc<StudentLoadRepository>,
    student_repo: Arc<StudentRepository>,
    config_manager: Arc<ConfigManager>,
}

impl LoadApi {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        load_repo: Arc<StudentLoadRepository>,
        student_repo: Arc<StudentRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            conn,
            load_repo,
            student_repo,
            config_manager,
        }
    }

    /// 手工添加选课
    ///
    /// # 返回
    /// - Ok(id): 新选课记录 id
    /// - Err(Conflict): 该学生该学期已有此课程
    /// - Err(BusinessRuleViolation): 学期未激活 / 课程不在方案中 / 先修课未通过
    pub fn add_load(
        &self,
        student_id: &str,
        term_id: i64,
        subject_id: i64,
        status: LoadStatus,
    ) -> ApiResult<i64> {
        let student_id = validate_student_id(student_id)?;
        let config = self.config_manager.load_engine_config()?;

        let load_id = with_transaction(&self.conn, |tx| {
            let student = StudentRepository::find_by_student_id_in(tx, student_id)?
                .filter(|student| student.is_active)
                .ok_or_else(|| ApiError::NotFound(format!("学生(id={})不存在或已停用", student_id)))?;
            let term = AcademicTermRepository::find_by_id_in(tx, term_id)?
                .ok_or_else(|| ApiError::NotFound(format!("学期(id={})不存在", term_id)))?;
            if config.load_requires_active_term && !term.is_active {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "学期未激活: {}",
                    term.label()
                )));
            }
            let subject = SubjectRepository::find_by_id_in(tx, subject_id)?
                .ok_or_else(|| ApiError::NotFound(format!("课程(id={})不存在", subject_id)))?;

            let entries = ProspectusRepository::list_by_context_in(
                tx,
                student.program_id,
                student.year_level,
                term.semester,
            )?;
            let context = ScheduleContext {
                program_id: student.program_id,
                year_level: student.year_level,
                semester: term.semester,
                academic_year: term.year_label.clone(),
                section_id: student.section_id,
            };
            let matched =
                ScheduleResolver::new(config.load_term_match).match_curriculum(&context, &entries);
            let entry = matched
                .entries
                .iter()
                .find(|e| e.subject_id == subject.id)
                .ok_or_else(|| {
                    ApiError::BusinessRuleViolation(format!(
                        "课程 {} 不在学生 {} 的 {} 培养方案中",
                        subject.code,
                        student.student_id,
                        term.label()
                    ))
                })?;

            if config.enforce_prerequisites {
                let loads = StudentLoadRepository::list_views_for_student_in(tx, student.id)?;
                if !PrerequisiteIndex::from_loads(&loads).is_eligible(entry) {
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "先修课未通过: {}",
                        subject.code
                    )));
                }
            }

            let id = StudentLoadRepository::insert_in(tx, student.id, term.id, subject.id, status)
                .map_err(|e| {
                    if e.is_unique_violation() {
                        ApiError::Conflict(format!(
                            "学生 {} 在 {} 已选 {}",
                            student.student_id,
                            term.label(),
                            subject.code
                        ))
                    } else {
                        ApiError::from(e)
                    }
                })?;
            Ok(id)
        })?;

        info!(student_id, term_id, subject_id, load_id, "手工选课完成");
        Ok(load_id)
    }

    pub fn update_load_status(&self, load_id: i64, status: LoadStatus) -> ApiResult<()> {
        self.load_repo.update_status(load_id, status)?;
        info!(load_id, status = %status, "选课状态已更新");
        Ok(())
    }

    pub fn remove_load(&self, load_id: i64) -> ApiResult<()> {
        self.load_repo.delete(load_id)?;
        info!(load_id, "选课记录已删除");
        Ok(())
    }

    /// 学生全部选课（按创建顺序）
    pub fn list_loads(&self, student_id: &str) -> ApiResult<Vec<StudentLoadView>> {
        let student_id = validate_student_id(student_id)?;
        let student = self
            .student_repo
            .find_by_student_id(student_id)?
            .ok_or_else(|| ApiError::NotFound(format!("学生(id={})不存在", student_id)))?;
        Ok(self.load_repo.list_views_for_student(student.id)?)
    }
}
