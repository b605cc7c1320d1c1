// ==========================================
// 并发自动选课测试
// ==========================================
// 多线程共享同一 AppState 同时对同一学生自动选课，
// 每门课程最终只有一条记录
// ==========================================

mod helpers;
mod test_helpers;

use helpers::test_data_builder::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_auto_load_same_student() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    EntryBuilder::template(fx.program_id, fx.math101).create(&state);
    EntryBuilder::template(fx.program_id, fx.eng101).create(&state);
    EntryBuilder::template(fx.program_id, fx.cs101).create(&state);
    let pk = StudentBuilder::new("S1", fx.program_id).create(&state);

    let state = Arc::new(state);
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            let term_id = fx.term_id;
            thread::spawn(move || state.progression_api.auto_load("S1", term_id).unwrap())
        })
        .collect();

    let created: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap().created_load_rows)
        .sum();

    assert_eq!(created, 3);
    assert_eq!(state.load_repo.count_for_student_term(pk, fx.term_id).unwrap(), 3);
}

#[test]
fn test_concurrent_promotions_different_students() {
    let (_tmp, state) = test_helpers::create_test_state();
    let fx = seed_catalog(&state);
    EntryBuilder::template(fx.program_id, fx.eng101)
        .year_level(2)
        .create(&state);
    let ids: Vec<String> = (0..6).map(|i| format!("S{}", i)).collect();
    for id in &ids {
        StudentBuilder::new(id, fx.program_id).create(&state);
    }

    let state = Arc::new(state);
    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let state = Arc::clone(&state);
            let term_id = fx.term_id;
            thread::spawn(move || state.progression_api.promote(&id, 2, term_id).unwrap())
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().unwrap();
        assert_eq!(outcome.new_year_level, 2);
        assert_eq!(outcome.auto_load.created_load_rows, 1);
    }
}
