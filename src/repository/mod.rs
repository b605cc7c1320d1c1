// ==========================================
// 教务注册系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 事务: 需要跨表原子性的操作使用 *_in(&Connection) 方法，
//       由引擎层在 db::with_transaction 内组合调用
// ==========================================

pub mod catalog_repo;
pub(crate) mod convert;
pub mod error;
pub mod prospectus_repo;
pub mod student_load_repo;
pub mod student_repo;

// 重导出核心仓储
pub use catalog_repo::{
    AcademicTermRepository, DepartmentRepository, ProgramRepository, SectionRepository,
    SubjectRepository,
};
pub use error::{RepositoryError, RepositoryResult};
pub use prospectus_repo::ProspectusRepository;
pub use student_load_repo::StudentLoadRepository;
pub use student_repo::{ApprovalCommit, ProgressionUpdate, StudentRepository};
