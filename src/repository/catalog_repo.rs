// ==========================================
// 教务注册系统 - 目录数据仓储
// ==========================================
// 覆盖: department / program / section / academic_term / subject
// 红线: Repository 不含业务逻辑
// ==========================================

mod department;
mod program;
mod section;
mod subject;
mod term;


pub use department::DepartmentRepository;
pub use program::ProgramRepository;
pub use section::SectionRepository;
pub use subject::SubjectRepository;
pub use term::AcademicTermRepository;
