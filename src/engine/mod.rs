// ==========================================
// 教务注册系统 - 引擎层
// ==========================================
// 职责: 课表解析、学期匹配、先修课判定、升级与自动选课、双签审批
// 红线: 所有写操作经 db::with_transaction，单事务内完成
// ==========================================

pub mod approval;
pub mod eligibility;
pub mod error;
pub mod progression;
pub mod schedule_resolver;
pub mod term_matcher;

// 重导出核心引擎
pub use approval::{resolve_signatory, ApprovalEngine, FinalizeOutcome};
pub use eligibility::{partition_by_prerequisite, PrerequisiteIndex};
pub use error::{EngineError, EngineResult};
pub use progression::{
    AutoLoadOutcome, AutoLoadPlan, BatchOutcome, PlannedSubject, ProgressionEngine,
    PromotionOutcome,
};
pub use schedule_resolver::{
    CurriculumMatch, ResolvedSchedule, ResolvedSubject, ScheduleContext, ScheduleResolver,
    ScheduleSource, UNKNOWN_SUBJECT_TITLE,
};
pub use term_matcher::{find_active_term, find_term};
