// ==========================================
// 教务注册系统 - 培养方案维护 API
// ==========================================
// 职责: 条目新增 / 查询 / 删除，CSV 批量导入
// 规则: 学年与班级须同时填写或同时留空；班级须属于同一专业
// ==========================================

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_academic_year, validate_year_level};
use crate::config::ConfigManager;
use crate::domain::prospectus::{EntryScope, NewProspectusEntry, ProspectusEntry};
use crate::importer::{ImportSummary, ProspectusImporter};
use crate::repository::{
    ProgramRepository, ProspectusRepository, SectionRepository, SubjectRepository,
};

pub struct CurriculumApi {
    prospectus_repo: Arc<ProspectusRepository>,
    program_repo: Arc<ProgramRepository>,
    section_repo: Arc<SectionRepository>,
    subject_repo: Arc<SubjectRepository>,
    importer: Arc<ProspectusImporter>,
    config_manager: Arc<ConfigManager>,
}

impl CurriculumApi {
    pub fn new(
        prospectus_repo: Arc<ProspectusRepository>,
        program_repo: Arc<ProgramRepository>,
        section_repo: Arc<SectionRepository>,
        subject_repo: Arc<SubjectRepository>,
        importer: Arc<ProspectusImporter>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            prospectus_repo,
            program_repo,
            section_repo,
            subject_repo,
            importer,
            config_manager,
        }
    }

    /// 新增条目
    ///
    /// # 返回
    /// - Err(InvalidInput): 学年 / 班级只填其一、学年格式错误、年级越界
    /// - Err(NotFound): 专业 / 课程 / 班级 / 先修课不存在
    /// - Err(Conflict): 同一映射已存在
    pub fn add_entry(&self, entry: &NewProspectusEntry) -> ApiResult<i64> {
        if entry.scope() == EntryScope::Mixed {
            return Err(ApiError::InvalidInput(
                "学年与班级须同时填写或同时留空".to_string(),
            ));
        }
        if !entry.academic_year.trim().is_empty() {
            validate_academic_year(&entry.academic_year)?;
        }
        let max = self.config_manager.load_engine_config()?.max_year_level;
        validate_year_level(entry.year_level, max)?;

        self.program_repo
            .find_by_id(entry.program_id)?
            .ok_or_else(|| ApiError::NotFound(format!("专业(id={})不存在", entry.program_id)))?;
        self.subject_repo
            .find_by_id(entry.subject_id)?
            .ok_or_else(|| ApiError::NotFound(format!("课程(id={})不存在", entry.subject_id)))?;
        if let Some(section_id) = entry.section_id {
            let section = self
                .section_repo
                .find_by_id(section_id)?
                .ok_or_else(|| ApiError::NotFound(format!("班级(id={})不存在", section_id)))?;
            if section.program_id != entry.program_id {
                return Err(ApiError::InvalidInput(format!(
                    "班级 {} 不属于专业(id={})",
                    section.name, entry.program_id
                )));
            }
        }
        if let Some(prerequisite_id) = entry.prerequisite_id {
            if prerequisite_id == entry.subject_id {
                return Err(ApiError::InvalidInput("课程不能以自身为先修".to_string()));
            }
            self.subject_repo.find_by_id(prerequisite_id)?.ok_or_else(|| {
                ApiError::NotFound(format!("先修课程(id={})不存在", prerequisite_id))
            })?;
        }

        let id = self.prospectus_repo.create(entry)?;
        info!(entry_id = id, program_id = entry.program_id, "培养方案条目已新增");
        Ok(id)
    }

    /// 专业全部条目（按 id 升序）
    pub fn list_entries(&self, program_id: i64) -> ApiResult<Vec<ProspectusEntry>> {
        Ok(self.prospectus_repo.list_by_program(program_id)?)
    }

    pub fn remove_entry(&self, entry_id: i64) -> ApiResult<()> {
        self.prospectus_repo.delete(entry_id)?;
        info!(entry_id, "培养方案条目已删除");
        Ok(())
    }

    /// CSV 批量导入
    pub fn import_csv(&self, path: &Path) -> ApiResult<ImportSummary> {
        Ok(self.importer.import_file(path)?)
    }
}
