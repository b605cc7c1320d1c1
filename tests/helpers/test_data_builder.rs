// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use registrar_engine::app::AppState;
use registrar_engine::domain::catalog::{AcademicTerm, Program, Section, Subject};
use registrar_engine::domain::prospectus::NewProspectusEntry;
use registrar_engine::domain::student::NewStudent;
use registrar_engine::domain::types::Semester;

pub const YEAR: &str = "2024-2025";

// ==========================================
// 目录数据
// ==========================================

pub fn create_program(state: &AppState, code: &str, adviser: &str, dean: &str) -> i64 {
    state
        .program_repo
        .create(&Program {
            id: 0,
            code: code.to_string(),
            name: format!("Program {}", code),
            department_id: None,
            program_adviser: adviser.to_string(),
            school_dean: dean.to_string(),
        })
        .unwrap()
}

pub fn create_section(state: &AppState, program_id: i64, name: &str, year_level: u8) -> i64 {
    state
        .section_repo
        .create(&Section {
            id: 0,
            name: name.to_string(),
            program_id,
            year_level,
            semester: Semester::First,
        })
        .unwrap()
}

pub fn create_subject(state: &AppState, code: &str, title: &str) -> i64 {
    state
        .subject_repo
        .create(&Subject {
            id: 0,
            code: code.to_string(),
            title: title.to_string(),
            units: "3".to_string(),
        })
        .unwrap()
}

pub fn create_term(state: &AppState, year_label: &str, semester: Semester, is_active: bool) -> i64 {
    state
        .term_repo
        .create(&AcademicTerm {
            id: 0,
            year_label: year_label.to_string(),
            semester,
            is_active,
        })
        .unwrap()
}

// ==========================================
// 培养方案条目构建器
// ==========================================

pub struct EntryBuilder {
    entry: NewProspectusEntry,
}

impl EntryBuilder {
    /// 默认: 模板条目（学年空、班级空），1 年级第一学期
    pub fn template(program_id: i64, subject_id: i64) -> Self {
        Self {
            entry: NewProspectusEntry {
                program_id,
                subject_id,
                year_level: 1,
                semester: Semester::First,
                academic_year: String::new(),
                section_id: None,
                prerequisite_id: None,
            },
        }
    }

    pub fn scoped(mut self, academic_year: &str, section_id: i64) -> Self {
        self.entry.academic_year = academic_year.to_string();
        self.entry.section_id = Some(section_id);
        self
    }

    pub fn year_level(mut self, year_level: u8) -> Self {
        self.entry.year_level = year_level;
        self
    }

    pub fn semester(mut self, semester: Semester) -> Self {
        self.entry.semester = semester;
        self
    }

    pub fn prerequisite(mut self, subject_id: i64) -> Self {
        self.entry.prerequisite_id = Some(subject_id);
        self
    }

    pub fn build(self) -> NewProspectusEntry {
        self.entry
    }

    pub fn create(self, state: &AppState) -> i64 {
        state.prospectus_repo.create(&self.entry).unwrap()
    }
}

// ==========================================
// 学生构建器
// ==========================================

pub struct StudentBuilder {
    student: NewStudent,
}

impl StudentBuilder {
    pub fn new(student_id: &str, program_id: i64) -> Self {
        Self {
            student: NewStudent {
                student_id: student_id.to_string(),
                first_name: "Juan".to_string(),
                last_name: "Dela Cruz".to_string(),
                middle_name: String::new(),
                program_id,
                section_id: None,
                year_level: 1,
                academic_year: YEAR.to_string(),
                semester: Some(Semester::First),
                adviser_name: String::new(),
                dean_name: String::new(),
            },
        }
    }

    pub fn section(mut self, section_id: i64) -> Self {
        self.student.section_id = Some(section_id);
        self
    }

    pub fn year_level(mut self, year_level: u8) -> Self {
        self.student.year_level = year_level;
        self
    }

    pub fn signatories(mut self, adviser: &str, dean: &str) -> Self {
        self.student.adviser_name = adviser.to_string();
        self.student.dean_name = dean.to_string();
        self
    }

    pub fn create(self, state: &AppState) -> i64 {
        state.student_repo.create(&self.student).unwrap()
    }
}

// ==========================================
// 标准场景
// ==========================================

/// BSIT 专业、A 班（1 年级）、2024-2025 第一学期（激活）
/// 课程: MATH101 / ENG101 / CS101 / CS201
pub struct Fixture {
    pub program_id: i64,
    pub section_id: i64,
    pub term_id: i64,
    pub math101: i64,
    pub eng101: i64,
    pub cs101: i64,
    pub cs201: i64,
}

pub fn seed_catalog(state: &AppState) -> Fixture {
    let program_id = create_program(state, "BSIT", "Dr. Reyes", "");
    let section_id = create_section(state, program_id, "A", 1);
    let term_id = create_term(state, YEAR, Semester::First, true);
    Fixture {
        program_id,
        section_id,
        term_id,
        math101: create_subject(state, "MATH101", "Algebra I"),
        eng101: create_subject(state, "ENG101", "English I"),
        cs101: create_subject(state, "CS101", "Intro to Computing"),
        cs201: create_subject(state, "CS201", "Data Structures"),
    }
}
