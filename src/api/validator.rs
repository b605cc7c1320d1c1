// ==========================================
// 教务注册系统 - 输入校验
// ==========================================
// 职责: API 入口参数的格式校验，失败返回 InvalidInput
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::is_valid_academic_year;

/// 学号: 非空，去除首尾空白
pub fn validate_student_id(student_id: &str) -> ApiResult<&str> {
    let trimmed = student_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("学号不能为空".to_string()));
    }
    Ok(trimmed)
}

/// 学年: "YYYY-YYYY"，连续两年
pub fn validate_academic_year(academic_year: &str) -> ApiResult<&str> {
    let trimmed = academic_year.trim();
    if !is_valid_academic_year(trimmed) {
        return Err(ApiError::InvalidInput(format!(
            "学年格式无效: {}（应为 YYYY-YYYY）",
            academic_year
        )));
    }
    Ok(trimmed)
}

/// 年级: 1..=max
pub fn validate_year_level(year_level: u8, max_year_level: u8) -> ApiResult<u8> {
    if year_level < 1 || year_level > max_year_level {
        return Err(ApiError::InvalidInput(format!(
            "年级无效: {}（允许 1..={}）",
            year_level, max_year_level
        )));
    }
    Ok(year_level)
}

/// 批量学号: 至少一个，去重保序
pub fn validate_student_ids(student_ids: &[String]) -> ApiResult<Vec<String>> {
    let mut result: Vec<String> = Vec::with_capacity(student_ids.len());
    for id in student_ids {
        let id = validate_student_id(id)?;
        if !result.iter().any(|existing| existing == id) {
            result.push(id.to_string());
        }
    }
    if result.is_empty() {
        return Err(ApiError::InvalidInput("学号列表不能为空".to_string()));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_student_id() {
        assert_eq!(validate_student_id(" 2024-0001 ").unwrap(), "2024-0001");
        assert!(validate_student_id("  ").is_err());
    }

    #[test]
    fn test_validate_academic_year() {
        assert_eq!(validate_academic_year("2024-2025").unwrap(), "2024-2025");
        assert!(matches!(
            validate_academic_year("2024/2025"),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_year_level() {
        assert!(validate_year_level(0, 4).is_err());
        assert!(validate_year_level(5, 4).is_err());
        assert_eq!(validate_year_level(4, 4).unwrap(), 4);
    }

    #[test]
    fn test_validate_student_ids_dedup() {
        let ids = vec!["A".to_string(), " A ".to_string(), "B".to_string()];
        assert_eq!(validate_student_ids(&ids).unwrap(), vec!["A", "B"]);
        assert!(validate_student_ids(&[]).is_err());
    }
}
