// ==========================================
// 教务注册系统 - 课表解析引擎
// ==========================================
// 职责: 为 (专业, 年级, 学期, 学年, 班级) 上下文求出展示课表
// 优先级（首个非空层胜出）:
//   1. 当前选课: 学生已有的、学期匹配的选课记录
//   2. 定向方案: 学年 + 班级 精确匹配的培养方案条目
//   3. 模板方案: 学年为空且班级为空的条目
//   4. 空结果
// 红线: 纯函数，不访问数据库；未命中不是错误
// ==========================================

use crate::domain::catalog::{term_label, SubjectCatalog};
use crate::domain::prospectus::{EntryScope, ProspectusEntry};
use crate::domain::student::StudentLoadView;
use crate::domain::types::{LoadTermMatch, Semester};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 课程缺失时的占位标题
pub const UNKNOWN_SUBJECT_TITLE: &str = "Unknown Subject";

// ==========================================
// ScheduleContext - 解析上下文
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleContext {
    pub program_id: i64,
    pub year_level: u8,
    pub semester: Semester,
    pub academic_year: String,
    pub section_id: Option<i64>,
}

impl ScheduleContext {
    fn academic_year(&self) -> &str {
        self.academic_year.trim()
    }

    /// 定向层需要学年与班级同时存在
    fn has_scoped_key(&self) -> bool {
        self.section_id.is_some() && !self.academic_year().is_empty()
    }
}

/// 结果来源层
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleSource {
    CurrentLoads,
    ScopedCurriculum,
    TemplateCurriculum,
    None,
}

/// 课表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSubject {
    pub subject_id: i64,
    pub code: String,
    pub title: String,
}

// ==========================================
// ResolvedSchedule - 解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSchedule {
    pub source: ScheduleSource,
    pub subjects: Vec<ResolvedSubject>,
}

impl ResolvedSchedule {
    pub fn empty() -> Self {
        Self {
            source: ScheduleSource::None,
            subjects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// (code, title) 序列
    pub fn rows(&self) -> Vec<(String, String)> {
        self.subjects
            .iter()
            .map(|s| (s.code.clone(), s.title.clone()))
            .collect()
    }

    /// 定稿文本: 每行 "CODE - TITLE"，以换行连接
    pub fn render_text(&self) -> String {
        self.subjects
            .iter()
            .map(|s| format!("{} - {}", s.code, s.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 培养方案层的匹配结果（保留条目本身，供自动选课使用）
#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumMatch<'a> {
    pub source: ScheduleSource,
    pub entries: Vec<&'a ProspectusEntry>,
}

// ==========================================
// ScheduleResolver - 课表解析器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleResolver {
    load_term_match: LoadTermMatch,
}

impl ScheduleResolver {
    pub fn new(load_term_match: LoadTermMatch) -> Self {
        Self { load_term_match }
    }

    pub fn load_term_match(&self) -> LoadTermMatch {
        self.load_term_match
    }

    /// 三层解析
    ///
    /// # 参数
    /// - existing_loads: 学生全部选课（按创建顺序）；非学生场景传空切片
    /// - entries: 培养方案条目（任意顺序，内部按 id 排序）
    pub fn resolve(
        &self,
        context: &ScheduleContext,
        existing_loads: &[StudentLoadView],
        entries: &[ProspectusEntry],
        catalog: &SubjectCatalog,
    ) -> ResolvedSchedule {
        let from_loads: Vec<ResolvedSubject> = existing_loads
            .iter()
            .filter(|load| self.load_matches_term(load, context.academic_year(), context.semester))
            .map(|load| ResolvedSubject {
                subject_id: load.subject_id,
                code: load.subject_code.clone(),
                title: load.subject_title.clone(),
            })
            .collect();

        if !from_loads.is_empty() {
            debug!(
                program_id = context.program_id,
                count = from_loads.len(),
                "课表取自当前选课"
            );
            return ResolvedSchedule {
                source: ScheduleSource::CurrentLoads,
                subjects: from_loads,
            };
        }

        let matched = self.match_curriculum(context, entries);
        if matched.entries.is_empty() {
            debug!(
                program_id = context.program_id,
                year_level = context.year_level,
                semester = %context.semester,
                "课表三层均未命中"
            );
            return ResolvedSchedule::empty();
        }

        debug!(
            program_id = context.program_id,
            source = ?matched.source,
            count = matched.entries.len(),
            "课表取自培养方案"
        );
        ResolvedSchedule {
            source: matched.source,
            subjects: matched
                .entries
                .iter()
                .map(|entry| render_subject(entry.subject_id, catalog))
                .collect(),
        }
    }

    /// 仅培养方案层（定向 → 模板）
    pub fn match_curriculum<'a>(
        &self,
        context: &ScheduleContext,
        entries: &'a [ProspectusEntry],
    ) -> CurriculumMatch<'a> {
        let mut in_group: Vec<&ProspectusEntry> = entries
            .iter()
            .filter(|e| e.belongs_to(context.program_id, context.year_level, context.semester))
            .collect();
        in_group.sort_by_key(|e| e.id);

        if context.has_scoped_key() {
            let scoped: Vec<&ProspectusEntry> = in_group
                .iter()
                .copied()
                .filter(|e| {
                    e.scope() == EntryScope::Scoped
                        && e.academic_year.trim() == context.academic_year()
                        && e.section_id == context.section_id
                })
                .collect();
            if !scoped.is_empty() {
                return CurriculumMatch {
                    source: ScheduleSource::ScopedCurriculum,
                    entries: scoped,
                };
            }
        }

        let template: Vec<&ProspectusEntry> = in_group
            .into_iter()
            .filter(|e| e.scope() == EntryScope::Template)
            .collect();
        if !template.is_empty() {
            return CurriculumMatch {
                source: ScheduleSource::TemplateCurriculum,
                entries: template,
            };
        }

        CurriculumMatch {
            source: ScheduleSource::None,
            entries: Vec::new(),
        }
    }

    fn load_matches_term(&self, load: &StudentLoadView, academic_year: &str, semester: Semester) -> bool {
        if academic_year.is_empty() {
            return false;
        }
        match self.load_term_match {
            LoadTermMatch::Structured => {
                load.term_year_label.trim() == academic_year && load.term_semester == semester
            }
            LoadTermMatch::LegacyLabel => {
                let label = term_label(&load.term_year_label, load.term_semester);
                label.contains(academic_year) && label.contains(&semester.to_string())
            }
        }
    }
}

/// 课程不在目录中时输出 (原始 id, "Unknown Subject")
fn render_subject(subject_id: i64, catalog: &SubjectCatalog) -> ResolvedSubject {
    match catalog.get(subject_id) {
        Some(subject) => ResolvedSubject {
            subject_id,
            code: subject.code.clone(),
            title: subject.title.clone(),
        },
        None => ResolvedSubject {
            subject_id,
            code: subject_id.to_string(),
            title: UNKNOWN_SUBJECT_TITLE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Subject;
    use crate::domain::types::LoadStatus;

    fn catalog() -> SubjectCatalog {
        SubjectCatalog::new(vec![
            Subject {
                id: 1,
                code: "MATH101".to_string(),
                title: "Algebra I".to_string(),
                units: "3".to_string(),
            },
            Subject {
                id: 2,
                code: "ENG101".to_string(),
                title: "English I".to_string(),
                units: "3".to_string(),
            },
            Subject {
                id: 3,
                code: "CS101".to_string(),
                title: "Intro to Computing".to_string(),
                units: "3".to_string(),
            },
        ])
    }

    fn context(academic_year: &str, section_id: Option<i64>) -> ScheduleContext {
        ScheduleContext {
            program_id: 10,
            year_level: 1,
            semester: Semester::First,
            academic_year: academic_year.to_string(),
            section_id,
        }
    }

    fn entry(id: i64, subject_id: i64, academic_year: &str, section_id: Option<i64>) -> ProspectusEntry {
        ProspectusEntry {
            id,
            program_id: 10,
            subject_id,
            year_level: 1,
            semester: Semester::First,
            academic_year: academic_year.to_string(),
            section_id,
            prerequisite_id: None,
        }
    }

    fn load(id: i64, year_label: &str, semester: Semester, subject_id: i64, code: &str) -> StudentLoadView {
        StudentLoadView {
            id,
            status: LoadStatus::Enrolled,
            term_id: 1,
            term_year_label: year_label.to_string(),
            term_semester: semester,
            subject_id,
            subject_code: code.to_string(),
            subject_title: format!("{} title", code),
        }
    }

    #[test]
    fn test_template_fallback_when_no_scoped_entries() {
        let resolver = ScheduleResolver::default();
        let entries = vec![entry(1, 1, "", None)];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &[], &entries, &catalog());

        assert_eq!(schedule.source, ScheduleSource::TemplateCurriculum);
        assert_eq!(
            schedule.rows(),
            vec![("MATH101".to_string(), "Algebra I".to_string())]
        );
    }

    #[test]
    fn test_current_loads_override_curriculum() {
        let resolver = ScheduleResolver::default();
        let entries = vec![entry(1, 1, "", None), entry(2, 3, "2024-2025", Some(5))];
        let loads = vec![
            load(7, "2023-2024", Semester::First, 3, "CS101"),
            load(8, "2024-2025", Semester::First, 2, "ENG101"),
        ];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &loads, &entries, &catalog());

        assert_eq!(schedule.source, ScheduleSource::CurrentLoads);
        assert_eq!(schedule.rows().len(), 1);
        assert_eq!(schedule.subjects[0].code, "ENG101");
    }

    #[test]
    fn test_scoped_entries_win_and_keep_id_order() {
        let resolver = ScheduleResolver::default();
        let entries = vec![
            entry(9, 2, "2024-2025", Some(5)),
            entry(3, 1, "", None),
            entry(4, 3, "2024-2025", Some(5)),
            entry(5, 1, "2024-2025", Some(6)),
        ];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &[], &entries, &catalog());

        assert_eq!(schedule.source, ScheduleSource::ScopedCurriculum);
        let codes: Vec<&str> = schedule.subjects.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["CS101", "ENG101"]);
    }

    #[test]
    fn test_missing_section_skips_scoped_tier() {
        let resolver = ScheduleResolver::default();
        let entries = vec![entry(1, 3, "2024-2025", Some(5)), entry(2, 1, "", None)];

        let schedule = resolver.resolve(&context("2024-2025", None), &[], &entries, &catalog());
        assert_eq!(schedule.source, ScheduleSource::TemplateCurriculum);
        assert_eq!(schedule.subjects[0].code, "MATH101");

        let schedule = resolver.resolve(&context("", Some(5)), &[], &entries, &catalog());
        assert_eq!(schedule.source, ScheduleSource::TemplateCurriculum);
    }

    #[test]
    fn test_empty_when_nothing_matches() {
        let resolver = ScheduleResolver::default();
        let mut other_program = entry(1, 1, "", None);
        other_program.program_id = 99;
        let mut other_year = entry(2, 1, "", None);
        other_year.year_level = 2;

        let schedule = resolver.resolve(
            &context("2024-2025", Some(5)),
            &[],
            &[other_program, other_year],
            &catalog(),
        );

        assert_eq!(schedule, ResolvedSchedule::empty());
        assert_eq!(schedule.render_text(), "");
    }

    #[test]
    fn test_mixed_entries_are_ignored() {
        let resolver = ScheduleResolver::default();
        let entries = vec![entry(1, 1, "2024-2025", None), entry(2, 2, "", Some(5))];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &[], &entries, &catalog());
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_unknown_subject_placeholder() {
        let resolver = ScheduleResolver::default();
        let entries = vec![entry(1, 404, "", None), entry(2, 1, "", None)];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &[], &entries, &catalog());

        assert_eq!(
            schedule.rows(),
            vec![
                ("404".to_string(), UNKNOWN_SUBJECT_TITLE.to_string()),
                ("MATH101".to_string(), "Algebra I".to_string()),
            ]
        );
        assert_eq!(schedule.render_text(), "404 - Unknown Subject\nMATH101 - Algebra I");
    }

    #[test]
    fn test_structured_match_rejects_near_miss() {
        let resolver = ScheduleResolver::new(LoadTermMatch::Structured);
        let loads = vec![load(1, "2024-2025", Semester::Second, 2, "ENG101")];
        let entries = vec![entry(1, 1, "", None)];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &loads, &entries, &catalog());
        assert_eq!(schedule.source, ScheduleSource::TemplateCurriculum);
    }

    #[test]
    fn test_legacy_label_substring_match() {
        let resolver = ScheduleResolver::new(LoadTermMatch::LegacyLabel);
        // 学年为子串时同样命中
        let loads = vec![
            load(1, "2024-2025 (A)", Semester::First, 2, "ENG101"),
            load(2, "2024-2025", Semester::Second, 3, "CS101"),
        ];

        let schedule = resolver.resolve(&context("2024-2025", Some(5)), &loads, &[], &catalog());
        assert_eq!(schedule.source, ScheduleSource::CurrentLoads);
        assert_eq!(schedule.rows(), vec![("ENG101".to_string(), "ENG101 title".to_string())]);

        let structured = ScheduleResolver::new(LoadTermMatch::Structured);
        let schedule = structured.resolve(&context("2024-2025", Some(5)), &loads, &[], &catalog());
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_match_curriculum_exposes_entries() {
        let resolver = ScheduleResolver::default();
        let entries = vec![entry(2, 2, "", None), entry(1, 1, "", None)];

        let matched = resolver.match_curriculum(&context("2024-2025", Some(5)), &entries);
        assert_eq!(matched.source, ScheduleSource::TemplateCurriculum);
        let ids: Vec<i64> = matched.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
