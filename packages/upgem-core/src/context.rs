//! 应用上下文
//!
//! 每个应用实例构造一次，持有存储、成长引擎和名录，并负责把名录事件
//! 转成成长事件。

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, StorageBackend};
use crate::engine::ProgressionEngine;
use crate::error::CoreResult;
use crate::models::{Habit, NewSkill, Skill};
use crate::roster::Roster;
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore, TypedStore};

pub struct AppContext {
    store: TypedStore,
    clock: Arc<dyn Clock>,
    pub engine: ProgressionEngine,
    pub roster: Roster,
}

impl AppContext {
    /// 按配置打开存储并加载全部状态
    pub fn open(config: &Config) -> CoreResult<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Sqlite => {
                std::fs::create_dir_all(&config.data_dir)?;
                Arc::new(SqliteStore::open(config.db_path())?)
            }
        };
        Self::with_store(store, Arc::new(SystemClock))
    }

    /// 使用给定存储和时钟构造
    pub fn with_store(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        let store = TypedStore::new(store);
        let engine = ProgressionEngine::open(store.clone(), Arc::clone(&clock))?;
        let roster = Roster::open(store.clone(), Arc::clone(&clock))?;
        Ok(Self {
            store,
            clock,
            engine,
            roster,
        })
    }

    pub fn store(&self) -> &TypedStore {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 新增技能并计入 skillsCompleted
    pub fn add_skill(&mut self, new: NewSkill) -> CoreResult<Skill> {
        let skill = self.roster.create_skill(new)?;
        self.engine.track_skill(&skill.name)?;
        Ok(skill)
    }

    /// 记录某技能的练习：累加技能时长、奖励 XP、标记今天的热力图
    pub fn log_practice(&mut self, skill_id: &str, hours: f64) -> CoreResult<u64> {
        self.roster.add_skill_hours(skill_id, hours)?;
        let reward = self.engine.log_practice(hours)?;
        self.engine.record_habit_completion(skill_id, None)?;
        Ok(reward)
    }

    /// 完成习惯：更新习惯连续周期、奖励 XP，并把全局连续数设为仍有效的习惯连续数中的最大值
    pub fn complete_habit(&mut self, habit_id: &str) -> CoreResult<Habit> {
        let now = self.clock.now();
        let habit = self.roster.log_habit_completion(habit_id, now)?;
        self.engine.complete_habit()?;
        self.engine
            .update_streak(self.roster.max_current_streak(now.date_naive()))?;
        Ok(habit)
    }

    /// 清空内存状态和所有持久化键
    pub(crate) fn reset(&mut self) -> CoreResult<()> {
        self.engine.reset()?;
        self.roster.reset()?;
        Ok(())
    }
}
