// ==========================================
// 教务注册系统 - 升级与自动选课 API
// ==========================================
// 职责: 入参校验后委托 ProgressionEngine
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::validator::{
    validate_academic_year, validate_student_id, validate_student_ids, validate_year_level,
};
use crate::config::ConfigManager;
use crate::domain::types::Semester;
use crate::engine::progression::{
    AutoLoadOutcome, AutoLoadPlan, BatchOutcome, ProgressionEngine, PromotionOutcome,
};

pub struct ProgressionApi {
    engine: Arc<ProgressionEngine>,
    config_manager: Arc<ConfigManager>,
}

impl ProgressionApi {
    pub fn new(engine: Arc<ProgressionEngine>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            engine,
            config_manager,
        }
    }

    fn check_year_level(&self, year_level: u8) -> ApiResult<u8> {
        let max = self.config_manager.load_engine_config()?.max_year_level;
        validate_year_level(year_level, max)
    }

    pub fn promote(
        &self,
        student_id: &str,
        target_year_level: u8,
        term_id: i64,
    ) -> ApiResult<PromotionOutcome> {
        let student_id = validate_student_id(student_id)?;
        let target_year_level = self.check_year_level(target_year_level)?;
        Ok(self.engine.promote(student_id, target_year_level, term_id)?)
    }

    /// 按 (学年, 学期) 升级；学期不存在返回 TermNotFound
    pub fn promote_for_term(
        &self,
        student_id: &str,
        target_year_level: u8,
        academic_year: &str,
        semester: Semester,
    ) -> ApiResult<PromotionOutcome> {
        let student_id = validate_student_id(student_id)?;
        let target_year_level = self.check_year_level(target_year_level)?;
        let academic_year = validate_academic_year(academic_year)?;
        Ok(self
            .engine
            .promote_for_term(student_id, target_year_level, academic_year, semester)?)
    }

    pub fn promote_students(
        &self,
        student_ids: &[String],
        target_year_level: u8,
        term_id: i64,
    ) -> ApiResult<BatchOutcome> {
        let student_ids = validate_student_ids(student_ids)?;
        let target_year_level = self.check_year_level(target_year_level)?;
        Ok(self
            .engine
            .promote_students(&student_ids, target_year_level, term_id)?)
    }

    pub fn auto_load_preview(&self, student_id: &str, term_id: i64) -> ApiResult<AutoLoadPlan> {
        let student_id = validate_student_id(student_id)?;
        Ok(self.engine.preview_auto_load(student_id, term_id)?)
    }

    pub fn auto_load(&self, student_id: &str, term_id: i64) -> ApiResult<AutoLoadOutcome> {
        let student_id = validate_student_id(student_id)?;
        Ok(self.engine.auto_load(student_id, term_id)?)
    }

    pub fn auto_load_students(&self, student_ids: &[String], term_id: i64) -> ApiResult<BatchOutcome> {
        let student_ids = validate_student_ids(student_ids)?;
        Ok(self.engine.auto_load_students(&student_ids, term_id)?)
    }
}
