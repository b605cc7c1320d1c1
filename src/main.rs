// ==========================================
// 教务注册系统 - 主入口
// ==========================================
// 打开（必要时初始化）数据库并输出目录概况
// ==========================================

use registrar_engine::app::{get_default_db_path, AppState};
use registrar_engine::engine::find_active_term;
use registrar_engine::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", registrar_engine::APP_NAME);
    tracing::info!("系统版本: {}", registrar_engine::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let config = state.config_manager.load_engine_config()?;
    let programs = state.program_repo.list_all()?;
    let subjects = state.subject_repo.list_all()?;
    let terms = state.term_repo.list_all()?;
    let students = state.student_repo.list_active()?;

    tracing::info!(
        programs = programs.len(),
        subjects = subjects.len(),
        terms = terms.len(),
        active_students = students.len(),
        "目录概况"
    );
    match find_active_term(&terms) {
        Some(term) => tracing::info!(term = %term.label(), "当前激活学期"),
        None => tracing::warn!("没有激活的学期，升级操作将被拒绝"),
    }
    tracing::info!(?config, "引擎配置");

    Ok(())
}
