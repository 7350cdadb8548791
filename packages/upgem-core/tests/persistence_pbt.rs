//! Property-Based Tests for persisted progression state
//!
//! Invariants:
//! - Stats Round-Trip: mutations followed by a reopen reproduce identical stats
//! - Activity log never exceeds its capacity and stays newest-first
//! - Habit tracking holds at most one record per (skillId, date)

mod common;

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use upgem_algo::{ActivityKind, ACTIVITY_LOG_CAPACITY};

use common::TestApp;

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    AddXp(u64),
    Practice(u32),
    Streak(u32),
    Habit,
    Skill,
    NextDay,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..=2_000).prop_map(Op::AddXp),
        // 以刻钟为单位，JSON 往返精确
        (0u32..=40).prop_map(Op::Practice),
        (0u32..=120).prop_map(Op::Streak),
        Just(Op::Habit),
        Just(Op::Skill),
        Just(Op::NextDay),
    ]
}

fn apply(app: &mut TestApp, op: &Op) {
    let engine = &mut app.ctx.engine;
    match op {
        Op::AddXp(amount) => {
            engine.add_xp(*amount, None).expect("Failed to add xp");
        }
        Op::Practice(quarters) => {
            engine
                .log_practice(f64::from(*quarters) / 4.0)
                .expect("Failed to log practice");
        }
        Op::Streak(days) => engine.update_streak(*days).expect("Failed to update streak"),
        Op::Habit => engine.complete_habit().expect("Failed to complete habit"),
        Op::Skill => {
            app.add_skill("Generated");
        }
        Op::NextDay => app.clock.advance(Duration::days(1)),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_stats_roundtrip(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut app = TestApp::new();
        for op in &ops {
            apply(&mut app, op);
        }

        let reopened = app.reopen();
        prop_assert_eq!(reopened.engine.stats(), app.ctx.engine.stats());
        prop_assert_eq!(
            reopened.engine.unlocked_achievements(),
            app.ctx.engine.unlocked_achievements()
        );
        prop_assert_eq!(reopened.engine.activity_log(), app.ctx.engine.activity_log());
    }

    #[test]
    fn prop_level_never_lags_total_xp(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut app = TestApp::new();
        for op in &ops {
            apply(&mut app, op);
        }

        let engine = &app.ctx.engine;
        prop_assert!(engine.current_level_xp() < engine.xp_to_next_level());
        prop_assert!(engine.stats().longest_streak >= engine.stats().current_streak);
    }

    #[test]
    fn prop_activity_log_bounded_and_newest_first(count in 0usize..300) {
        let mut app = TestApp::new();
        for i in 0..count {
            app.ctx
                .engine
                .log_activity(ActivityKind::Habit, format!("award {i}"), "✅", None)
                .expect("Failed to log activity");
        }

        let log = app.ctx.engine.activity_log();
        prop_assert!(log.len() <= ACTIVITY_LOG_CAPACITY);
        if count > 0 {
            let newest = format!("award {}", count - 1);
            prop_assert_eq!(&log[0].description, &newest);
        }
    }

    #[test]
    fn prop_tracking_unique_per_skill_and_day(
        records in prop::collection::vec((0u8..4, 0i64..20), 0..60)
    ) {
        let mut app = TestApp::new();
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (skill, offset) in &records {
            app.ctx
                .engine
                .record_habit_completion(&format!("skill-{skill}"), Some(base + Duration::days(*offset)))
                .expect("Failed to record");
        }

        let distinct: HashSet<(u8, i64)> = records.iter().copied().collect();
        prop_assert_eq!(app.ctx.engine.habit_tracking().len(), distinct.len());
    }
}
