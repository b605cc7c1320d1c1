// ==========================================
// 教务注册系统 - 培养方案 CSV 导入
// ==========================================
// 列: program_code, subject_code, year_level, semester,
//     academic_year, section_name, prerequisite_code
// 流程: 解析 → 逐行校验 → 单事务写入
// 规则:
// - 学年与班级须同时填写（定向）或同时留空（模板）
// - 重复映射计入 skipped_duplicates，不视为错误
// - 校验失败的行记录行号与原因，其余行照常导入
// ==========================================

use crate::config::ConfigManager;
use crate::db::with_transaction;
use crate::domain::catalog::is_valid_academic_year;
use crate::domain::prospectus::{EntryScope, NewProspectusEntry};
use crate::domain::types::Semester;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{parse_csv_file, parse_csv_reader, RawRecord};
use crate::repository::{
    ProgramRepository, ProspectusRepository, SectionRepository, SubjectRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

/// 必需列
pub const REQUIRED_COLUMNS: [&str; 4] = ["program_code", "subject_code", "year_level", "semester"];

/// 行级错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub skipped_duplicates: usize,
    pub errors: Vec<RowError>,
}

// ==========================================
// ProspectusImporter - 培养方案导入器
// ==========================================
pub struct ProspectusImporter {
    conn: Arc<Mutex<Connection>>,
    config_manager: Arc<ConfigManager>,
}

impl ProspectusImporter {
    pub fn new(conn: Arc<Mutex<Connection>>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            conn,
            config_manager,
        }
    }

    /// 从文件导入
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_file(&self, path: &Path) -> ImportResult<ImportSummary> {
        let records = parse_csv_file(path, &REQUIRED_COLUMNS)?;
        self.import_records(records)
    }

    /// 从 Reader 导入
    pub fn import_reader<R: Read>(&self, reader: R) -> ImportResult<ImportSummary> {
        let records = parse_csv_reader(reader, &REQUIRED_COLUMNS)?;
        self.import_records(records)
    }

    fn import_records(&self, records: Vec<RawRecord>) -> ImportResult<ImportSummary> {
        let max_year_level = self.config_manager.load_engine_config()?.max_year_level;

        let summary = with_transaction(&self.conn, |tx| {
            let mut summary = ImportSummary {
                total_rows: records.len(),
                ..Default::default()
            };

            for record in &records {
                let entry = match build_entry(tx, record, max_year_level) {
                    Ok(entry) => entry,
                    Err(message) => {
                        warn!(row = record.row_number, %message, "培养方案行校验失败");
                        summary.errors.push(RowError {
                            row: record.row_number,
                            message,
                        });
                        continue;
                    }
                };

                match ProspectusRepository::create_in(tx, &entry) {
                    Ok(_) => summary.imported += 1,
                    Err(e) if e.is_unique_violation() => summary.skipped_duplicates += 1,
                    Err(e) => return Err(ImportError::from(e)),
                }
            }
            Ok(summary)
        })?;

        info!(
            total = summary.total_rows,
            imported = summary.imported,
            duplicates = summary.skipped_duplicates,
            errors = summary.errors.len(),
            "培养方案导入完成"
        );
        Ok(summary)
    }
}

/// 行 → 条目；失败返回可读原因
fn build_entry(
    conn: &Connection,
    record: &RawRecord,
    max_year_level: u8,
) -> Result<NewProspectusEntry, String> {
    let program_code = required(record, "program_code")?;
    let program = ProgramRepository::find_by_code_in(conn, program_code)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("专业不存在: {}", program_code))?;

    let subject_code = required(record, "subject_code")?;
    let subject = SubjectRepository::find_by_code_in(conn, subject_code)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("课程不存在: {}", subject_code))?;

    let year_level = required(record, "year_level")?
        .parse::<u8>()
        .ok()
        .filter(|v| (1..=max_year_level).contains(v))
        .ok_or_else(|| format!("年级无效: {}（允许 1..={}）", record.get("year_level"), max_year_level))?;

    let semester = required(record, "semester")?
        .parse::<u8>()
        .ok()
        .and_then(Semester::from_u8)
        .ok_or_else(|| format!("学期无效: {}", record.get("semester")))?;

    let academic_year = record.get("academic_year");
    if !academic_year.is_empty() && !is_valid_academic_year(academic_year) {
        return Err(format!("学年格式无效: {}（应为 YYYY-YYYY）", academic_year));
    }

    let section_name = record.get("section_name");
    let section_id = if section_name.is_empty() {
        None
    } else {
        let section = SectionRepository::find_by_program_and_name_in(conn, program.id, section_name)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("班级不存在: {} / {}", program_code, section_name))?;
        Some(section.id)
    };

    let prerequisite_code = record.get("prerequisite_code");
    let prerequisite_id = if prerequisite_code.is_empty() {
        None
    } else {
        let prerequisite = SubjectRepository::find_by_code_in(conn, prerequisite_code)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("先修课程不存在: {}", prerequisite_code))?;
        if prerequisite.id == subject.id {
            return Err(format!("课程不能以自身为先修: {}", subject_code));
        }
        Some(prerequisite.id)
    };

    let entry = NewProspectusEntry {
        program_id: program.id,
        subject_id: subject.id,
        year_level,
        semester,
        academic_year: academic_year.to_string(),
        section_id,
        prerequisite_id,
    };
    if entry.scope() == EntryScope::Mixed {
        return Err("学年与班级须同时填写或同时留空".to_string());
    }
    Ok(entry)
}

fn required<'a>(record: &'a RawRecord, column: &str) -> Result<&'a str, String> {
    let value = record.get(column);
    if value.is_empty() {
        Err(format!("缺少字段: {}", column))
    } else {
        Ok(value)
    }
}
