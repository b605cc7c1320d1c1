// ==========================================
// 教务注册系统 - 升级与自动选课引擎
// ==========================================
// 职责:
// - 自动选课: 按培养方案（定向 → 模板）为学生生成 enrolled 选课记录
// - 升级: 修改年级并按新年级自动选课
// 事务: 每个写操作在单个 SQLite 事务内完成，失败整体回滚
// 幂等: (学生, 学期, 课程) 唯一约束冲突视为已存在，计入 skipped
// ==========================================

use crate::config::{ConfigManager, EngineConfig};
use crate::db::with_transaction;
use crate::domain::catalog::{AcademicTerm, SubjectCatalog};
use crate::domain::prospectus::ProspectusEntry;
use crate::domain::student::{Student, StudentLoadView};
use crate::domain::types::{LoadStatus, Semester};
use crate::engine::eligibility::partition_by_prerequisite;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::schedule_resolver::{
    ScheduleContext, ScheduleResolver, ScheduleSource, UNKNOWN_SUBJECT_TITLE,
};
use crate::engine::term_matcher::find_term;
use crate::repository::error::RepositoryError;
use crate::repository::{
    AcademicTermRepository, ProspectusRepository, StudentLoadRepository, StudentRepository,
    SubjectRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// 结果类型
// ==========================================

/// 计划中的一门课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSubject {
    pub subject_id: i64,
    pub code: String,
    pub title: String,
    pub prerequisite_id: Option<i64>,
}

/// 自动选课预览
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLoadPlan {
    pub student_id: String,
    pub term_id: i64,
    pub source: ScheduleSource,
    pub eligible: Vec<PlannedSubject>,
    pub blocked_by_prerequisite: Vec<PlannedSubject>,
    pub already_loaded: Vec<PlannedSubject>,
}

/// 单个学生的自动选课结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLoadOutcome {
    pub created_load_rows: usize,
    pub created_load_ids: Vec<i64>,
    pub skipped_existing: usize,
    pub blocked_by_prerequisite: usize,
}

impl AutoLoadOutcome {
    fn absorb(&mut self, other: &AutoLoadOutcome) {
        self.created_load_rows += other.created_load_rows;
        self.created_load_ids.extend_from_slice(&other.created_load_ids);
        self.skipped_existing += other.skipped_existing;
        self.blocked_by_prerequisite += other.blocked_by_prerequisite;
    }
}

/// 单个学生的升级结果（student 与 created_loads 为事务提交前读回的状态）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionOutcome {
    pub student: Student,
    pub previous_year_level: u8,
    pub new_year_level: u8,
    pub term_id: i64,
    pub auto_load: AutoLoadOutcome,
    pub created_loads: Vec<StudentLoadView>,
}

/// 批量操作结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub processed_students: Vec<String>,
    pub skipped_students: Vec<String>,
    pub auto_load: AutoLoadOutcome,
}

// ==========================================
// ProgressionEngine - 升级引擎
// ==========================================
pub struct ProgressionEngine {
    conn: Arc<Mutex<Connection>>,
    config_manager: Arc<ConfigManager>,
}

impl ProgressionEngine {
    pub fn new(conn: Arc<Mutex<Connection>>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            conn,
            config_manager,
        }
    }

    // 配置须在事务外读取（共用同一连接锁）
    fn load_config(&self) -> EngineResult<EngineConfig> {
        Ok(self.config_manager.load_engine_config()?)
    }

    /// 自动选课预览（只读）
    pub fn preview_auto_load(&self, student_id: &str, term_id: i64) -> EngineResult<AutoLoadPlan> {
        let config = self.load_config()?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let student = load_student(&conn, student_id)?;
        let term = load_term(&conn, term_id)?;
        plan_in(&conn, &student, &term, &config)
    }

    /// 为单个学生自动选课
    #[instrument(skip(self))]
    pub fn auto_load(&self, student_id: &str, term_id: i64) -> EngineResult<AutoLoadOutcome> {
        let config = self.load_config()?;
        let outcome = with_transaction(&self.conn, |tx| {
            let student = load_student(tx, student_id)?;
            let term = load_term(tx, term_id)?;
            auto_load_in(tx, &student, &term, &config)
        })?;

        info!(
            student_id,
            term_id,
            created = outcome.created_load_rows,
            skipped = outcome.skipped_existing,
            blocked = outcome.blocked_by_prerequisite,
            "自动选课完成"
        );
        Ok(outcome)
    }

    /// 批量自动选课（单事务；未知或停用学生跳过）
    #[instrument(skip(self, student_ids), fields(count = student_ids.len()))]
    pub fn auto_load_students(&self, student_ids: &[String], term_id: i64) -> EngineResult<BatchOutcome> {
        let config = self.load_config()?;
        let batch = with_transaction(&self.conn, |tx| {
            let term = load_term(tx, term_id)?;
            let mut batch = BatchOutcome::default();
            for student_id in student_ids {
                let Some(student) = active_student(tx, student_id)? else {
                    batch.skipped_students.push(student_id.clone());
                    continue;
                };
                let outcome = auto_load_in(tx, &student, &term, &config)?;
                batch.auto_load.absorb(&outcome);
                batch.processed_students.push(student.student_id);
            }
            Ok::<_, EngineError>(batch)
        })?;

        info!(
            term_id,
            processed = batch.processed_students.len(),
            skipped = batch.skipped_students.len(),
            created = batch.auto_load.created_load_rows,
            "批量自动选课完成"
        );
        Ok(batch)
    }

    /// 升级: 修改年级并按新年级自动选课（同一事务）
    #[instrument(skip(self))]
    pub fn promote(
        &self,
        student_id: &str,
        target_year_level: u8,
        term_id: i64,
    ) -> EngineResult<PromotionOutcome> {
        let config = self.load_config()?;
        validate_year_level(target_year_level, &config)?;

        let outcome = with_transaction(&self.conn, |tx| {
            let term = load_term(tx, term_id)?;
            promote_in(tx, student_id, target_year_level, &term, &config)
        })?;
        log_promotion(&outcome);
        Ok(outcome)
    }

    /// 按 (学年, 学期) 升级；学期不存在时不做任何写入
    #[instrument(skip(self))]
    pub fn promote_for_term(
        &self,
        student_id: &str,
        target_year_level: u8,
        academic_year: &str,
        semester: Semester,
    ) -> EngineResult<PromotionOutcome> {
        let config = self.load_config()?;
        validate_year_level(target_year_level, &config)?;

        let outcome = with_transaction(&self.conn, |tx| {
            let terms = AcademicTermRepository::list_all_in(tx)?;
            let term = find_term(academic_year, semester, &terms)?.clone();
            promote_in(tx, student_id, target_year_level, &term, &config)
        })?;
        log_promotion(&outcome);
        Ok(outcome)
    }

    /// 批量升级（单事务；未知或停用学生跳过）
    #[instrument(skip(self, student_ids), fields(count = student_ids.len()))]
    pub fn promote_students(
        &self,
        student_ids: &[String],
        target_year_level: u8,
        term_id: i64,
    ) -> EngineResult<BatchOutcome> {
        let config = self.load_config()?;
        validate_year_level(target_year_level, &config)?;

        let batch = with_transaction(&self.conn, |tx| {
            let term = load_term(tx, term_id)?;
            ensure_term_active(&term, &config)?;

            let mut batch = BatchOutcome::default();
            for student_id in student_ids {
                let Some(mut student) = active_student(tx, student_id)? else {
                    batch.skipped_students.push(student_id.clone());
                    continue;
                };
                StudentRepository::update_year_level_in(tx, student.id, target_year_level)?;
                student.year_level = target_year_level;
                let outcome = auto_load_in(tx, &student, &term, &config)?;
                batch.auto_load.absorb(&outcome);
                batch.processed_students.push(student.student_id);
            }
            Ok::<_, EngineError>(batch)
        })?;

        info!(
            term_id,
            target_year_level,
            promoted = batch.processed_students.len(),
            skipped = batch.skipped_students.len(),
            created = batch.auto_load.created_load_rows,
            "批量升级完成"
        );
        Ok(batch)
    }
}

// ==========================================
// 事务内步骤
// ==========================================

fn validate_year_level(target: u8, config: &EngineConfig) -> EngineResult<()> {
    if target < 1 || target > config.max_year_level {
        return Err(EngineError::InvalidYearLevel {
            value: target,
            max: config.max_year_level,
        });
    }
    Ok(())
}

fn ensure_term_active(term: &AcademicTerm, config: &EngineConfig) -> EngineResult<()> {
    if config.promotion_requires_active_term && !term.is_active {
        return Err(EngineError::TermNotActive(term.label()));
    }
    Ok(())
}

fn load_student(conn: &Connection, student_id: &str) -> EngineResult<Student> {
    StudentRepository::find_by_student_id_in(conn, student_id)?
        .filter(|student| student.is_active)
        .ok_or_else(|| EngineError::StudentNotFound(student_id.trim().to_string()))
}

fn active_student(conn: &Connection, student_id: &str) -> EngineResult<Option<Student>> {
    match StudentRepository::find_by_student_id_in(conn, student_id)? {
        Some(student) if student.is_active => Ok(Some(student)),
        _ => {
            warn!(student_id, "学生不存在或已停用，跳过");
            Ok(None)
        }
    }
}

fn load_term(conn: &Connection, term_id: i64) -> EngineResult<AcademicTerm> {
    AcademicTermRepository::find_by_id_in(conn, term_id)?
        .ok_or_else(|| RepositoryError::not_found("AcademicTerm", term_id).into())
}

fn promote_in(
    conn: &Connection,
    student_id: &str,
    target_year_level: u8,
    term: &AcademicTerm,
    config: &EngineConfig,
) -> EngineResult<PromotionOutcome> {
    ensure_term_active(term, config)?;
    let mut student = load_student(conn, student_id)?;

    let previous_year_level = student.year_level;
    StudentRepository::update_year_level_in(conn, student.id, target_year_level)?;
    student.year_level = target_year_level;

    let auto_load = auto_load_in(conn, &student, term, config)?;

    let student = StudentRepository::find_by_pk_in(conn, student.id)?
        .ok_or_else(|| RepositoryError::not_found("Student", student.id))?;
    let created: HashSet<i64> = auto_load.created_load_ids.iter().copied().collect();
    let created_loads = StudentLoadRepository::list_views_for_student_in(conn, student.id)?
        .into_iter()
        .filter(|view| created.contains(&view.id))
        .collect();

    Ok(PromotionOutcome {
        student,
        previous_year_level,
        new_year_level: target_year_level,
        term_id: term.id,
        auto_load,
        created_loads,
    })
}

/// 计算自动选课计划（不写入）
fn plan_in(
    conn: &Connection,
    student: &Student,
    term: &AcademicTerm,
    config: &EngineConfig,
) -> EngineResult<AutoLoadPlan> {
    let entries = ProspectusRepository::list_by_context_in(
        conn,
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
    let matched = ScheduleResolver::new(config.load_term_match).match_curriculum(&context, &entries);

    let loads = StudentLoadRepository::list_views_for_student_in(conn, student.id)?;
    let loaded_in_term: HashSet<i64> = loads
        .iter()
        .filter(|l| l.term_id == term.id)
        .map(|l| l.subject_id)
        .collect();

    let mut seen = HashSet::new();
    let mut already_loaded = Vec::new();
    let mut candidates = Vec::new();
    for entry in matched.entries {
        if !seen.insert(entry.subject_id) {
            continue;
        }
        if loaded_in_term.contains(&entry.subject_id) {
            already_loaded.push(entry);
        } else {
            candidates.push(entry);
        }
    }
    let (eligible, blocked) =
        partition_by_prerequisite(candidates, &loads, config.enforce_prerequisites);

    let catalog = SubjectCatalog::new(SubjectRepository::find_for_program_in(conn, student.program_id)?);
    let describe = |entries: Vec<&ProspectusEntry>| -> Vec<PlannedSubject> {
        entries
            .into_iter()
            .map(|e| {
                let (code, title) = catalog
                    .get(e.subject_id)
                    .map(|s| (s.code.clone(), s.title.clone()))
                    .unwrap_or_else(|| (e.subject_id.to_string(), UNKNOWN_SUBJECT_TITLE.to_string()));
                PlannedSubject {
                    subject_id: e.subject_id,
                    code,
                    title,
                    prerequisite_id: e.prerequisite_id,
                }
            })
            .collect()
    };

    Ok(AutoLoadPlan {
        student_id: student.student_id.clone(),
        term_id: term.id,
        source: matched.source,
        eligible: describe(eligible),
        blocked_by_prerequisite: describe(blocked),
        already_loaded: describe(already_loaded),
    })
}

/// 按计划写入选课记录；唯一约束冲突视为已存在
fn auto_load_in(
    conn: &Connection,
    student: &Student,
    term: &AcademicTerm,
    config: &EngineConfig,
) -> EngineResult<AutoLoadOutcome> {
    let plan = plan_in(conn, student, term, config)?;
    let mut outcome = AutoLoadOutcome {
        skipped_existing: plan.already_loaded.len(),
        blocked_by_prerequisite: plan.blocked_by_prerequisite.len(),
        ..AutoLoadOutcome::default()
    };

    for subject in &plan.eligible {
        match StudentLoadRepository::insert_in(
            conn,
            student.id,
            term.id,
            subject.subject_id,
            LoadStatus::Enrolled,
        ) {
            Ok(id) => {
                outcome.created_load_rows += 1;
                outcome.created_load_ids.push(id);
            }
            Err(e) if e.is_unique_violation() => outcome.skipped_existing += 1,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(outcome)
}

fn log_promotion(outcome: &PromotionOutcome) {
    info!(
        student_id = %outcome.student.student_id,
        from = outcome.previous_year_level,
        to = outcome.new_year_level,
        term_id = outcome.term_id,
        created = outcome.auto_load.created_load_rows,
        "升级完成"
    );
}
