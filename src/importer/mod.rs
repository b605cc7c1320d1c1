// ==========================================
// 教务注册系统 - 导入层
// ==========================================
// 职责: 培养方案 CSV 批量导入
// ==========================================

pub mod error;
pub mod file_parser;
pub mod prospectus_importer;

pub use error::{ImportError, ImportResult};
pub use file_parser::{parse_csv_file, parse_csv_reader, RawRecord};
pub use prospectus_importer::{ImportSummary, ProspectusImporter, RowError, REQUIRED_COLUMNS};
