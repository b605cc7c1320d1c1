// ==========================================
// 升级与自动选课集成测试
// ==========================================
// 覆盖: 自动选课幂等、先修课过滤、升级原子性、学期匹配失败不写入
// ==========================================

mod helpers;
mod test_helpers;

use helpers::test_data_builder::*;
use registrar_engine::api::ApiError;
use registrar_engine::app::AppState;
use registrar_engine::config::config_keys;
use registrar_engine::domain::types::{LoadStatus, Semester};
use registrar_engine::engine::{ScheduleSource, UNKNOWN_SUBJECT_TITLE};

/// 1 年级: MATH101, CS101；2 年级: CS201(先修 CS101), ENG101
fn seed_curriculum(state: &AppState) -> Fixture {
    let fx = seed_catalog(state);
    EntryBuilder::template(fx.program_id, fx.math101).create(state);
    EntryBuilder::template(fx.program_id, fx.cs101).create(state);
    EntryBuilder::template(fx.program_id, fx.cs201)
        .year_level(2)
        .prerequisite(fx.cs101)
        .create(state);
    EntryBuilder::template(fx.program_id, fx.eng101)
        .year_level(2)
        .create(state);
    fx
}

fn year_level_of(state: &AppState, student_id: &str) -> u8 {
    state
        .student_repo
        .find_by_student_id(student_id)
        .unwrap()
        .unwrap()
        .year_level
}

/// 在往期学期记一门已通过课程
fn record_passed(state: &AppState, student_pk: i64, subject_id: i64) {
    let past_term = create_term(state, "2023-2024", Semester::Second, false);
    state
        .load_repo
        .insert(student_pk, past_term, subject_id, LoadStatus::Passed)
        .unwrap();
}

#[test]
fn test_auto_load_creates_rows_and_is_idempotent() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    let pk = StudentBuilder::new("S1", fx.program_id)
        .section(fx.section_id)
        .create(&state);

    let first = state.progression_api.auto_load("S1", fx.term_id).unwrap();
    assert_eq!(first.created_load_rows, 2);
    assert_eq!(first.skipped_existing, 0);

    let second = state.progression_api.auto_load("S1", fx.term_id).unwrap();
    assert_eq!(second.created_load_rows, 0);
    assert_eq!(second.skipped_existing, 2);

    assert_eq!(state.load_repo.count_for_student_term(pk, fx.term_id).unwrap(), 2);
    let codes: Vec<String> = state
        .load_api
        .list_loads("S1")
        .unwrap()
        .into_iter()
        .map(|l| l.subject_code)
        .collect();
    assert_eq!(codes, vec!["MATH101", "CS101"]);
}

#[test]
fn test_auto_load_preview_reports_prerequisites() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    let pk = StudentBuilder::new("S1", fx.program_id)
        .year_level(2)
        .create(&state);

    let plan = state.progression_api.auto_load_preview("S1", fx.term_id).unwrap();
    assert_eq!(plan.source, ScheduleSource::TemplateCurriculum);
    let eligible: Vec<&str> = plan.eligible.iter().map(|s| s.code.as_str()).collect();
    let blocked: Vec<&str> = plan.blocked_by_prerequisite.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(eligible, vec!["ENG101"]);
    assert_eq!(blocked, vec!["CS201"]);

    // 预览不写入
    assert_eq!(state.load_repo.count_for_student_term(pk, fx.term_id).unwrap(), 0);

    record_passed(&state, pk, fx.cs101);
    let plan = state.progression_api.auto_load_preview("S1", fx.term_id).unwrap();
    assert_eq!(plan.eligible.len(), 2);
    assert!(plan.blocked_by_prerequisite.is_empty());
}

#[test]
fn test_prerequisite_enforcement_can_be_disabled() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    StudentBuilder::new("S1", fx.program_id)
        .year_level(2)
        .create(&state);
    state
        .config_manager
        .set_global_config_value(config_keys::PROGRESSION_ENFORCE_PREREQUISITES, "false")
        .unwrap();

    let outcome = state.progression_api.auto_load("S1", fx.term_id).unwrap();
    assert_eq!(outcome.created_load_rows, 2);
    assert_eq!(outcome.blocked_by_prerequisite, 0);
}

#[test]
fn test_promote_updates_year_level_and_loads() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    let pk = StudentBuilder::new("S1", fx.program_id)
        .section(fx.section_id)
        .create(&state);
    record_passed(&state, pk, fx.cs101);

    let outcome = state.progression_api.promote("S1", 2, fx.term_id).unwrap();

    assert_eq!(outcome.previous_year_level, 1);
    assert_eq!(outcome.new_year_level, 2);
    assert_eq!(outcome.auto_load.created_load_rows, 2);
    assert_eq!(year_level_of(&state, "S1"), 2);
    assert_eq!(state.load_repo.count_for_student_term(pk, fx.term_id).unwrap(), 2);

    // 返回提交后的学生记录与本次新建的选课
    assert_eq!(outcome.student.student_id, "S1");
    assert_eq!(outcome.student.year_level, 2);
    let created: Vec<(&str, i64, LoadStatus)> = outcome
        .created_loads
        .iter()
        .map(|l| (l.subject_code.as_str(), l.term_id, l.status))
        .collect();
    assert_eq!(
        created,
        vec![
            ("CS201", fx.term_id, LoadStatus::Enrolled),
            ("ENG101", fx.term_id, LoadStatus::Enrolled),
        ]
    );
    assert_eq!(outcome.auto_load.created_load_ids.len(), 2);
}

#[test]
fn test_promote_skips_subject_with_unmet_prerequisite() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);

    let outcome = state.progression_api.promote("S1", 2, fx.term_id).unwrap();
    assert_eq!(outcome.auto_load.created_load_rows, 1);
    assert_eq!(outcome.auto_load.blocked_by_prerequisite, 1);
    assert_eq!(outcome.created_loads.len(), 1);
    assert_eq!(outcome.created_loads[0].subject_code, "ENG101");

    let codes: Vec<String> = state
        .load_api
        .list_loads("S1")
        .unwrap()
        .into_iter()
        .map(|l| l.subject_code)
        .collect();
    assert_eq!(codes, vec!["ENG101"]);
}

#[test]
fn test_promote_for_unknown_term_makes_no_changes() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    let pk = StudentBuilder::new("S1", fx.program_id).create(&state);

    let err = state
        .progression_api
        .promote_for_term("S1", 2, "2030-2031", Semester::First)
        .unwrap_err();
    match err {
        ApiError::TermNotFound(msg) => assert!(msg.contains("2030-2031")),
        other => panic!("unexpected: {:?}", other),
    }

    assert_eq!(year_level_of(&state, "S1"), 1);
    assert!(state.load_repo.list_views_for_student(pk).unwrap().is_empty());

    // 精确匹配时成功
    let outcome = state
        .progression_api
        .promote_for_term("S1", 2, YEAR, Semester::First)
        .unwrap();
    assert_eq!(outcome.term_id, fx.term_id);
}

#[test]
fn test_promote_requires_active_term() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);
    let inactive = create_term(&state, YEAR, Semester::Second, false);

    let err = state.progression_api.promote("S1", 2, inactive).unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    assert_eq!(year_level_of(&state, "S1"), 1);

    state
        .config_manager
        .set_global_config_value(config_keys::PROGRESSION_REQUIRE_ACTIVE_TERM, "false")
        .unwrap();
    let outcome = state.progression_api.promote("S1", 2, inactive).unwrap();
    // 第二学期没有方案条目
    assert_eq!(outcome.auto_load.created_load_rows, 0);
    assert_eq!(year_level_of(&state, "S1"), 2);
}

#[test]
fn test_promote_rejects_invalid_input() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);

    for level in [0u8, 5] {
        let err = state.progression_api.promote("S1", level, fx.term_id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    let err = state.progression_api.promote("nobody", 2, fx.term_id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = state.progression_api.promote("S1", 2, 9999).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_promote_rolls_back_when_load_insert_fails() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    let pk = StudentBuilder::new("S1", fx.program_id).create(&state);
    {
        let conn = state.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER fail_load BEFORE INSERT ON student_load
             BEGIN SELECT RAISE(ABORT, 'load insert blocked'); END;",
        )
        .unwrap();
    }

    let result = state.progression_api.promote("S1", 2, fx.term_id);
    assert!(result.is_err());

    assert_eq!(year_level_of(&state, "S1"), 1);
    assert_eq!(state.load_repo.count_for_student_term(pk, fx.term_id).unwrap(), 0);
}

#[test]
fn test_batch_promotion_skips_unknown_and_inactive() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);
    StudentBuilder::new("S2", fx.program_id).create(&state);
    StudentBuilder::new("S3", fx.program_id).create(&state);
    state.student_repo.soft_delete("S3").unwrap();

    let ids: Vec<String> = ["S1", "S2", "S3", "S404"].iter().map(|s| s.to_string()).collect();
    let batch = state.progression_api.promote_students(&ids, 2, fx.term_id).unwrap();

    assert_eq!(batch.processed_students, vec!["S1", "S2"]);
    assert_eq!(batch.skipped_students, vec!["S3", "S404"]);
    // 每人仅 ENG101（CS201 先修未满足）
    assert_eq!(batch.auto_load.created_load_rows, 2);
    assert_eq!(year_level_of(&state, "S2"), 2);
    assert_eq!(year_level_of(&state, "S3"), 1);

    // 单人操作对停用学生报错
    let err = state.progression_api.promote("S3", 2, fx.term_id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_batch_auto_load() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_curriculum(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);
    StudentBuilder::new("S2", fx.program_id).create(&state);

    let ids = vec!["S1".to_string(), "S2".to_string()];
    let batch = state.progression_api.auto_load_students(&ids, fx.term_id).unwrap();
    assert_eq!(batch.auto_load.created_load_rows, 4);

    let again = state.progression_api.auto_load_students(&ids, fx.term_id).unwrap();
    assert_eq!(again.auto_load.created_load_rows, 0);
    assert_eq!(again.auto_load.skipped_existing, 4);
}

#[test]
fn test_auto_load_preview_labels_unresolved_subject() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    EntryBuilder::template(fx.program_id, fx.math101).create(&state);
    StudentBuilder::new("S1", fx.program_id).create(&state);
    {
        let conn = state.conn.lock().unwrap();
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = OFF;
             DELETE FROM subject WHERE id = {};
             PRAGMA foreign_keys = ON;",
            fx.math101
        ))
        .unwrap();
    }

    let plan = state.progression_api.auto_load_preview("S1", fx.term_id).unwrap();
    assert_eq!(plan.eligible.len(), 1);
    assert_eq!(plan.eligible[0].code, fx.math101.to_string());
    assert_eq!(plan.eligible[0].title, UNKNOWN_SUBJECT_TITLE);
}
