// ==========================================
// 教务注册系统 - CSV 文件解析
// ==========================================
// 输出: 按表头映射的原始记录（值已 trim），附带文件行号
// 规则: 表头大小写不敏感；完全空白的行跳过
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 一行原始记录
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row_number: usize, // 文件行号（表头为第 1 行）
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// 取字段值，缺失时返回空串
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// 解析 CSV 文件
pub fn parse_csv_file(path: &Path, required_columns: &[&str]) -> ImportResult<Vec<RawRecord>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !ext.eq_ignore_ascii_case("csv") {
        return Err(ImportError::UnsupportedFormat(ext.to_string()));
    }

    let file = File::open(path)?;
    parse_csv_reader(file, required_columns)
}

/// 从任意 Reader 解析 CSV
pub fn parse_csv_reader<R: Read>(
    reader: R,
    required_columns: &[&str],
) -> ImportResult<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    for column in required_columns {
        if !headers.iter().any(|h| h == column) {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let mut fields = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                fields.insert(header.clone(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if fields.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(RawRecord {
            row_number: idx + 2,
            fields,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reader_maps_headers() {
        let data = "Program_Code, subject_code ,year_level\nBSIT, MATH101 ,1\n,,\nBSIT,ENG101\n";
        let records = parse_csv_reader(data.as_bytes(), &["program_code", "subject_code"]).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_number, 2);
        assert_eq!(records[0].get("subject_code"), "MATH101");
        assert_eq!(records[1].row_number, 4);
        assert_eq!(records[1].get("year_level"), "");
    }

    #[test]
    fn test_missing_required_column() {
        let data = "program_code\nBSIT\n";
        let err = parse_csv_reader(data.as_bytes(), &["program_code", "subject_code"]).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "subject_code"));
    }

    #[test]
    fn test_file_checks() {
        let err = parse_csv_file(Path::new("/nonexistent/prospectus.csv"), &[]).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));

        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = parse_csv_file(file.path(), &[]).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
