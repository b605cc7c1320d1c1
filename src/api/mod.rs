// ==========================================
// 教务注册系统 - API 层
// ==========================================
// 职责: 调用方入口，负责入参校验与错误转换
// 红线: 业务规则在引擎层，API 层只做校验与委托
// ==========================================

pub mod approval_api;
pub mod curriculum_api;
pub mod error;
pub mod load_api;
pub mod progression_api;
pub mod schedule_api;
pub mod validator;

pub use approval_api::ApprovalApi;
pub use curriculum_api::CurriculumApi;
pub use error::{ApiError, ApiResult};
pub use load_api::LoadApi;
pub use progression_api::ProgressionApi;
pub use schedule_api::ScheduleApi;
