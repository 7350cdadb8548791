//! 本地键值存储模块
//!
//! 所有状态片段以 JSON 字符串写入键值存储，提供：
//! - 键值存储抽象 [`KeyValueStore`]（SQLite 与内存两种实现）
//! - 类型化的键 [`Slot`]，每个逻辑键对应一种记录类型
//! - 唯一的序列化边界 [`TypedStore`]

// ============================================================
// 子模块声明
// ============================================================

pub mod memory;
pub mod migrations;
pub mod sqlite;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use sqlite::SqliteStore;

// ============================================================
// 依赖导入
// ============================================================

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("迁移错误: {0}")]
    Migration(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("持久化数据损坏 (key = {key}): {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("锁获取失败: {0}")]
    LockError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================
// KeyValueStore - 键值存储抽象
// ============================================================

/// 字符串键到 JSON 字符串值的存储
///
/// 所有方法取 `&self`，实现自行保证内部可变性，使同一个存储可以被
/// 引擎、名录和重新打开的实例共享。
pub trait KeyValueStore: Send + Sync {
    /// 读取值，不存在时返回 None
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入值（覆盖）
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除键，返回是否确实删除了记录
    fn remove(&self, key: &str) -> StorageResult<bool>;

    /// 按字典序列出所有键
    fn keys(&self) -> StorageResult<Vec<String>>;
}

// ============================================================
// Slot - 类型化的键
// ============================================================

/// 绑定了记录类型的存储键
pub struct Slot<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Slot<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Slot").field(&self.name).finish()
    }
}

/// 应用使用的全部键
pub mod slots {
    use super::Slot;
    use crate::models::{Habit, Skill};
    use upgem_algo::{ActivityLogEntry, Goals, HabitTracking, LearningEntry, Stats};

    pub const STATS: Slot<Stats> = Slot::new("upgem_stats");
    pub const UNLOCKED_ACHIEVEMENTS: Slot<Vec<String>> = Slot::new("upgem_achievements");
    pub const ACTIVITY_LOG: Slot<Vec<ActivityLogEntry>> = Slot::new("upgem_activity");
    pub const GOALS: Slot<Goals> = Slot::new("upgem_goals");
    pub const LEARNING_ENTRIES: Slot<Vec<LearningEntry>> = Slot::new("upgem_learning");
    pub const HABIT_TRACKING: Slot<Vec<HabitTracking>> = Slot::new("upgem_habits_tracking");
    pub const SKILLS: Slot<Vec<Skill>> = Slot::new("skills");
    pub const HABITS: Slot<Vec<Habit>> = Slot::new("habits");
    pub const SETTINGS: Slot<serde_json::Map<String, serde_json::Value>> = Slot::new("settings");

    /// 应用拥有的所有键名
    pub const ALL: &[&str] = &[
        STATS.name(),
        UNLOCKED_ACHIEVEMENTS.name(),
        ACTIVITY_LOG.name(),
        GOALS.name(),
        LEARNING_ENTRIES.name(),
        HABIT_TRACKING.name(),
        SKILLS.name(),
        HABITS.name(),
        SETTINGS.name(),
    ];
}

// ============================================================
// TypedStore - 序列化边界
// ============================================================

/// 键值存储之上的类型化读写
#[derive(Clone)]
pub struct TypedStore {
    inner: Arc<dyn KeyValueStore>,
}

impl TypedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// 底层键值存储
    pub fn raw(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner
    }

    /// 读取并反序列化
    ///
    /// 键不存在时返回 `Ok(None)`；值无法解析时返回 [`StorageError::Corrupt`]。
    pub fn load<T: DeserializeOwned>(&self, slot: Slot<T>) -> StorageResult<Option<T>> {
        let Some(raw) = self.inner.get(slot.name())? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: slot.name().to_string(),
                source,
            })
    }

    /// 读取，不存在时取默认值
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, slot: Slot<T>) -> StorageResult<T> {
        Ok(self.load(slot)?.unwrap_or_default())
    }

    /// 序列化并写入
    pub fn save<T: Serialize>(&self, slot: Slot<T>, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        tracing::trace!(key = slot.name(), bytes = raw.len(), "saving slot");
        self.inner.set(slot.name(), &raw)
    }

    /// 删除键
    pub fn clear<T>(&self, slot: Slot<T>) -> StorageResult<bool> {
        self.inner.remove(slot.name())
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use upgem_algo::{Goals, Stats};

    fn typed() -> TypedStore {
        TypedStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_load_missing_key() {
        let store = typed();
        let stats = store.load(slots::STATS).expect("Failed to load");
        assert!(stats.is_none());

        let goals = store.load_or_default(slots::GOALS).expect("Failed to load");
        assert_eq!(goals, Goals::default());
    }

    #[test]
    fn test_save_and_load() {
        let store = typed();
        let stats = Stats {
            total_xp: 420,
            level: 3,
            total_hours: 2.5,
            ..Stats::default()
        };

        store.save(slots::STATS, &stats).expect("Failed to save");
        let loaded = store.load(slots::STATS).expect("Failed to load");
        assert_eq!(loaded, Some(stats));
    }

    #[test]
    fn test_persisted_layout_uses_original_field_names() {
        let store = typed();
        store
            .save(slots::STATS, &Stats::default())
            .expect("Failed to save");

        let raw = store
            .raw()
            .get("upgem_stats")
            .expect("Failed to get")
            .expect("missing value");
        assert!(raw.contains("\"totalXP\":0"));
        assert!(raw.contains("\"currentStreak\":0"));
    }

    #[test]
    fn test_corrupt_value_reports_key() {
        let store = typed();
        store
            .raw()
            .set("upgem_goals", "{not json")
            .expect("Failed to set");

        let err = store.load(slots::GOALS).unwrap_err();
        match err {
            StorageError::Corrupt { key, .. } => assert_eq!(key, "upgem_goals"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_clear_slot() {
        let store = typed();
        store
            .save(slots::GOALS, &Goals::default())
            .expect("Failed to save");
        assert!(store.clear(slots::GOALS).expect("Failed to clear"));
        assert!(!store.clear(slots::GOALS).expect("Failed to clear"));
    }

    #[test]
    fn test_all_keys_unique() {
        let mut keys = slots::ALL.to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), slots::ALL.len());
    }
}
