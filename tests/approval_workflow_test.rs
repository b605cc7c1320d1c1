// ==========================================
// 双签审批集成测试
// ==========================================

mod helpers;
mod test_helpers;

use helpers::test_data_builder::*;
use registrar_engine::api::ApiError;
use registrar_engine::domain::types::{ApprovalStatus, LoadStatus, Semester};
use registrar_engine::engine::ScheduleSource;

#[test]
fn test_finalize_commits_both_approvals() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    EntryBuilder::template(fx.program_id, fx.math101).create(&state);
    StudentBuilder::new("S1", fx.program_id)
        .section(fx.section_id)
        .signatories("Old Adviser", "Dean Cruz")
        .create(&state);

    let before = state.approval_api.approval_state("S1").unwrap();
    assert_eq!(before.adviser, ApprovalStatus::Pending);
    assert!(!before.is_finalized());

    let outcome = state
        .approval_api
        .finalize_approval("S1", YEAR, Semester::First)
        .unwrap();
    assert_eq!(outcome.schedule_text, "MATH101 - Algebra I");
    // 专业配置了导师，院长为空时沿用学生记录
    assert_eq!(outcome.adviser_name, "Dr. Reyes");
    assert_eq!(outcome.dean_name, "Dean Cruz");

    // 返回值即已提交的学生记录
    assert!(outcome.student.approval_state().is_finalized());
    assert_eq!(outcome.student.subject_load_schedule, "MATH101 - Algebra I");
    assert_eq!(outcome.student.adviser_name, "Dr. Reyes");
    assert_eq!(outcome.student.semester, Some(Semester::First));

    let student = state.student_repo.find_by_student_id("S1").unwrap().unwrap();
    assert!(student.approval_state().is_finalized());
    assert_eq!(student.subject_load_schedule, "MATH101 - Algebra I");
    assert_eq!(student.adviser_name, "Dr. Reyes");
    assert_eq!(student.dean_name, "Dean Cruz");
    assert_eq!(student.academic_year, YEAR);
    assert_eq!(student.semester, Some(Semester::First));
    assert_eq!(outcome.student, student);
}

#[test]
fn test_finalize_uses_current_loads() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    EntryBuilder::template(fx.program_id, fx.math101).create(&state);
    let pk = StudentBuilder::new("S1", fx.program_id).create(&state);
    state
        .load_repo
        .insert(pk, fx.term_id, fx.eng101, LoadStatus::Enrolled)
        .unwrap();
    state
        .load_repo
        .insert(pk, fx.term_id, fx.cs101, LoadStatus::Enrolled)
        .unwrap();

    let outcome = state
        .approval_api
        .finalize_approval("S1", YEAR, Semester::First)
        .unwrap();

    assert_eq!(outcome.schedule.source, ScheduleSource::CurrentLoads);
    assert_eq!(
        outcome.schedule_text,
        "ENG101 - English I\nCS101 - Intro to Computing"
    );
}

#[test]
fn test_finalize_with_empty_schedule_still_approves() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    StudentBuilder::new("S1", fx.program_id).year_level(3).create(&state);

    let outcome = state
        .approval_api
        .finalize_approval("S1", YEAR, Semester::Second)
        .unwrap();
    assert!(outcome.schedule.is_empty());
    assert_eq!(outcome.schedule_text, "");

    let state_after = state.approval_api.approval_state("S1").unwrap();
    assert!(state_after.is_finalized());
}

#[test]
fn test_finalize_errors_leave_student_pending() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);

    let err = state
        .approval_api
        .finalize_approval("S404", YEAR, Semester::First)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = state
        .approval_api
        .finalize_approval("S1", "2024-2026", Semester::First)
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let student = state.student_repo.find_by_student_id("S1").unwrap().unwrap();
    assert_eq!(student.adviser_approval_status, ApprovalStatus::Pending);
    assert_eq!(student.dean_approval_status, ApprovalStatus::Pending);
    assert_eq!(student.subject_load_schedule, "");
}
