// ==========================================
// 教务注册系统 - 应用状态
// ==========================================
// 职责: 打开共享连接、建表，装配 仓储 → 引擎 → API
// 连接: 所有组件共享同一个 Arc<Mutex<Connection>>
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ApprovalApi, CurriculumApi, LoadApi, ProgressionApi, ScheduleApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::engine::{ApprovalEngine, ProgressionEngine};
use crate::importer::ProspectusImporter;
use crate::repository::{
    AcademicTermRepository, DepartmentRepository, ProgramRepository, ProspectusRepository,
    SectionRepository, StudentLoadRepository, StudentRepository, SubjectRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "REGISTRAR_ENGINE_DB_PATH";

// ==========================================
// AppState - 应用状态
// ==========================================
pub struct AppState {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub config_manager: Arc<ConfigManager>,

    // ===== 仓储 =====
    pub department_repo: Arc<DepartmentRepository>,
    pub program_repo: Arc<ProgramRepository>,
    pub section_repo: Arc<SectionRepository>,
    pub term_repo: Arc<AcademicTermRepository>,
    pub subject_repo: Arc<SubjectRepository>,
    pub prospectus_repo: Arc<ProspectusRepository>,
    pub student_repo: Arc<StudentRepository>,
    pub load_repo: Arc<StudentLoadRepository>,

    // ===== API =====
    pub schedule_api: Arc<ScheduleApi>,
    pub progression_api: Arc<ProgressionApi>,
    pub approval_api: Arc<ApprovalApi>,
    pub load_api: Arc<LoadApi>,
    pub curriculum_api: Arc<CurriculumApi>,
}

impl AppState {
    /// 打开数据库文件并装配
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let version = read_schema_version(&conn)
            .map_err(|e| format!("无法读取schema版本: {}", e))?;
        tracing::info!(schema_version = ?version, "数据库结构就绪");

        Ok(Self::from_connection(db_path, Arc::new(Mutex::new(conn))))
    }

    /// 基于已打开（且已建表）的连接装配
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Self {
        let config_manager = Arc::new(ConfigManager::new(conn.clone()));

        let department_repo = Arc::new(DepartmentRepository::new(conn.clone()));
        let program_repo = Arc::new(ProgramRepository::new(conn.clone()));
        let section_repo = Arc::new(SectionRepository::new(conn.clone()));
        let term_repo = Arc::new(AcademicTermRepository::new(conn.clone()));
        let subject_repo = Arc::new(SubjectRepository::new(conn.clone()));
        let prospectus_repo = Arc::new(ProspectusRepository::new(conn.clone()));
        let student_repo = Arc::new(StudentRepository::new(conn.clone()));
        let load_repo = Arc::new(StudentLoadRepository::new(conn.clone()));

        let progression_engine =
            Arc::new(ProgressionEngine::new(conn.clone(), config_manager.clone()));
        let approval_engine = Arc::new(ApprovalEngine::new(conn.clone(), config_manager.clone()));
        let importer = Arc::new(ProspectusImporter::new(conn.clone(), config_manager.clone()));

        let schedule_api = Arc::new(ScheduleApi::new(
            prospectus_repo.clone(),
            subject_repo.clone(),
            student_repo.clone(),
            load_repo.clone(),
            config_manager.clone(),
        ));
        let progression_api = Arc::new(ProgressionApi::new(
            progression_engine,
            config_manager.clone(),
        ));
        let approval_api = Arc::new(ApprovalApi::new(approval_engine, student_repo.clone()));
        let load_api = Arc::new(LoadApi::new(
            conn.clone(),
            load_repo.clone(),
            student_repo.clone(),
            config_manager.clone(),
        ));
        let curriculum_api = Arc::new(CurriculumApi::new(
            prospectus_repo.clone(),
            program_repo.clone(),
            section_repo.clone(),
            subject_repo.clone(),
            importer,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            conn,
            config_manager,
            department_repo,
            program_repo,
            section_repo,
            term_repo,
            subject_repo,
            prospectus_repo,
            student_repo,
            load_repo,
            schedule_api,
            progression_api,
            approval_api,
            load_api,
            curriculum_api,
        }
    }
}

/// 默认数据库路径
///
/// 顺序: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./registrar.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录
        #[cfg(debug_assertions)]
        let dir = data_dir.join("registrar-engine-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("registrar-engine");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("registrar.db");
        }
    }

    path.to_string_lossy().to_string()
}
