#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use upgem_algo::{FocusLevel, Mood};
use upgem_core::models::{NewLearningEntry, NewSkill};
use upgem_core::{AppContext, Clock, FixedClock, KeyValueStore, MemoryStore};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

pub struct TestApp {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(start_time()));
        let ctx = open(&store, &clock);
        Self { ctx, store, clock }
    }

    /// 在同一个存储上重新打开上下文
    pub fn reopen(&self) -> AppContext {
        open(&self.store, &self.clock)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn add_skill(&mut self, name: &str) -> String {
        self.ctx
            .add_skill(NewSkill {
                name: name.to_string(),
                ..NewSkill::default()
            })
            .expect("Failed to add skill")
            .id
    }
}

pub fn open(store: &Arc<MemoryStore>, clock: &Arc<FixedClock>) -> AppContext {
    let store: Arc<dyn KeyValueStore> = store.clone();
    AppContext::with_store(store, clock.clone()).expect("Failed to open context")
}

pub fn journal_entry(skill_id: &str, date: NaiveDate) -> NewLearningEntry {
    NewLearningEntry {
        skill_id: skill_id.to_string(),
        date,
        lesson: "Practiced scales".to_string(),
        mood: Mood::Good,
        energy_before: 6,
        energy_after: 7,
        focus_level: FocusLevel::High,
        session_details: String::new(),
        tags: vec!["music".to_string()],
    }
}
