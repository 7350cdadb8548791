use std::sync::Arc;

use tempfile::TempDir;
use upgem_core::backup;
use upgem_core::config::{Config, StorageBackend};
use upgem_core::models::{HabitFrequency, NewHabit, NewSkill};
use upgem_core::{AppContext, FixedClock, KeyValueStore, SqliteStore};

mod common;

fn sqlite_config(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().join("nested").join("data"),
        db_file: "upgem-test.db".to_string(),
        storage: StorageBackend::Sqlite,
        log_level: "debug".to_string(),
        log_dir: None,
    }
}

#[test]
fn open_creates_data_dir_and_persists_across_runs() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = sqlite_config(&dir);

    let skill_id = {
        let mut ctx = AppContext::open(&config).expect("Failed to open context");
        let skill = ctx
            .add_skill(NewSkill {
                name: "Woodworking".to_string(),
                ..NewSkill::default()
            })
            .expect("Failed to add skill");
        ctx.log_practice(&skill.id, 3.0).expect("Failed to log practice");
        skill.id
    };

    assert!(config.db_path().exists());

    let ctx = AppContext::open(&config).expect("Failed to reopen context");
    assert_eq!(ctx.roster.skills().len(), 1);
    assert_eq!(ctx.roster.skills()[0].id, skill_id);
    assert_eq!(ctx.engine.stats().skills_completed, 1);
    assert_eq!(ctx.engine.stats().total_hours, 3.0);
    // 50 (first-skill) + 60 (3h)
    assert_eq!(ctx.engine.stats().total_xp, 110);
}

#[test]
fn backup_round_trip_between_databases() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let clock = Arc::new(FixedClock::new(common::start_time()));

    let source: Arc<dyn KeyValueStore> =
        Arc::new(SqliteStore::open(dir.path().join("source.db")).expect("Failed to open db"));
    let mut ctx = AppContext::with_store(source, clock.clone()).expect("Failed to open context");
    ctx.add_skill(NewSkill {
        name: "Ceramics".to_string(),
        ..NewSkill::default()
    })
    .expect("Failed to add skill");
    ctx.roster
        .create_habit(NewHabit {
            name: "Throw a bowl".to_string(),
            frequency: HabitFrequency::Weekly,
            description: Some("wheel practice".to_string()),
        })
        .expect("Failed to create habit");

    let exported = backup::export_json(&ctx).expect("Failed to export");
    let path = dir.path().join("backup.json");
    std::fs::write(&path, &exported).expect("Failed to write backup");

    let target: Arc<dyn KeyValueStore> =
        Arc::new(SqliteStore::open(dir.path().join("target.db")).expect("Failed to open db"));
    let mut restored = AppContext::with_store(target, clock).expect("Failed to open context");

    let text = std::fs::read_to_string(&path).expect("Failed to read backup");
    let doc = backup::parse_backup(&text).expect("Failed to parse backup");
    let summary = backup::restore(&mut restored, doc).expect("Failed to restore");

    assert_eq!(summary.skills, 1);
    assert_eq!(summary.habits, 1);
    assert_eq!(restored.roster.skills(), ctx.roster.skills());
    assert_eq!(restored.roster.habits(), ctx.roster.habits());
    // 导入不改动成长状态
    assert_eq!(restored.engine.stats().total_xp, 0);
}

#[test]
fn clear_all_empties_the_database() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = sqlite_config(&dir);

    let mut ctx = AppContext::open(&config).expect("Failed to open context");
    ctx.add_skill(NewSkill {
        name: "Chess".to_string(),
        ..NewSkill::default()
    })
    .expect("Failed to add skill");
    ctx.engine.set_goals(10, 70).expect("Failed to set goals");

    backup::clear_all(&mut ctx, "DELETE").expect("Failed to clear");
    assert!(ctx.store().raw().keys().expect("Failed to list keys").is_empty());
    drop(ctx);

    let reopened = AppContext::open(&config).expect("Failed to reopen context");
    assert!(reopened.roster.skills().is_empty());
    assert_eq!(reopened.engine.stats().level, 1);
    assert_eq!(reopened.engine.goals().daily_xp, 150);
}
