//! 成长引擎
//!
//! 持有 XP、等级、连续天数、成就、活动日志、学习日志与打卡记录的内存状态，
//! 每次变更后立即把对应片段写入键值存储。
//!
//! ## 持久化约定
//! - stats 与已解锁成就列表一起写入
//! - 活动日志、目标、学习日志、打卡记录各自独立写入
//! - 没有批量或事务合并，每次写入互不依赖
//! - 打开时逐键加载，缺失的键保持默认值，无法解析的键直接返回错误

mod insights;
mod journal;
mod tracking;

pub use insights::DashboardSnapshot;

use std::sync::Arc;

use serde::Serialize;
use upgem_algo::achievements::{self, ACHIEVEMENTS};
use upgem_algo::leveling::{current_level_xp, xp_for_level};
use upgem_algo::sanitize::practice_reward;
use upgem_algo::{
    Achievement, AchievementStatus, ActivityKind, ActivityLogEntry, Goals, HabitTracking,
    LearningEntry, Stats, ACTIVITY_LOG_CAPACITY, HABIT_XP,
};

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::storage::{slots, TypedStore};

/// `add_xp` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub xp: u64,
    pub reason: Option<String>,
    pub new_level: u32,
}

/// 成长引擎
pub struct ProgressionEngine {
    store: TypedStore,
    clock: Arc<dyn Clock>,
    stats: Stats,
    unlocked: Vec<String>,
    activity_log: Vec<ActivityLogEntry>,
    goals: Goals,
    learning_entries: Vec<LearningEntry>,
    habit_tracking: Vec<HabitTracking>,
}

impl ProgressionEngine {
    /// 从存储加载全部状态
    ///
    /// # Errors
    /// 任一键的值无法解析时返回 `StorageError::Corrupt`，不做任何修复。
    pub fn open(store: TypedStore, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        let engine = Self {
            stats: store.load_or_default(slots::STATS)?,
            unlocked: store.load_or_default(slots::UNLOCKED_ACHIEVEMENTS)?,
            activity_log: store.load_or_default(slots::ACTIVITY_LOG)?,
            goals: store.load_or_default(slots::GOALS)?,
            learning_entries: store.load_or_default(slots::LEARNING_ENTRIES)?,
            habit_tracking: store.load_or_default(slots::HABIT_TRACKING)?,
            store,
            clock,
        };

        tracing::debug!(
            level = engine.stats.level,
            total_xp = engine.stats.total_xp,
            activities = engine.activity_log.len(),
            journal = engine.learning_entries.len(),
            "progression state loaded"
        );
        Ok(engine)
    }

    // ========== 只读访问 ==========

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    /// 已解锁成就 id，按解锁顺序
    pub fn unlocked_achievements(&self) -> &[String] {
        &self.unlocked
    }

    /// 活动日志，最新在前
    pub fn activity_log(&self) -> &[ActivityLogEntry] {
        &self.activity_log
    }

    pub fn learning_entries(&self) -> &[LearningEntry] {
        &self.learning_entries
    }

    pub fn habit_tracking(&self) -> &[HabitTracking] {
        &self.habit_tracking
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 成就目录及解锁状态
    pub fn achievements(&self) -> Vec<AchievementStatus> {
        achievements::with_status(&self.unlocked)
    }

    /// 目录顺序中第一个未解锁的成就
    pub fn next_achievement(&self) -> Option<AchievementStatus> {
        self.achievements().into_iter().find(|a| !a.unlocked)
    }

    // ========== XP 与等级 ==========

    /// 当前等级内的 XP
    pub fn current_level_xp(&self) -> u64 {
        current_level_xp(self.stats.total_xp, self.stats.level)
    }

    /// 当前等级升级所需 XP
    pub fn xp_to_next_level(&self) -> u64 {
        xp_for_level(self.stats.level)
    }

    /// 增加 XP 并处理升级
    ///
    /// 先记录一条 xp 活动再累加 XP，然后只要当前等级内 XP 达到本级所需就升一级，
    /// 每次升级后检查成就（成就奖励会递归调用本方法），最后写入 stats。
    ///
    /// # Arguments
    /// * `amount` - 增加的 XP
    /// * `reason` - 活动描述，缺省为 "Earned {amount} XP"
    pub fn add_xp(&mut self, amount: u64, reason: Option<&str>) -> CoreResult<XpAward> {
        let description = reason
            .map(str::to_string)
            .unwrap_or_else(|| format!("Earned {amount} XP"));
        // 日志写入失败时 stats 保持不变
        self.log_activity(ActivityKind::Xp, description, "⚡", Some(amount))?;

        self.stats.total_xp = self.stats.total_xp.saturating_add(amount);

        while self.current_level_xp() >= self.xp_to_next_level() {
            self.stats.level += 1;
            tracing::info!(level = self.stats.level, total_xp = self.stats.total_xp, "level up");
            self.check_achievements()?;
        }

        self.save_stats()?;

        Ok(XpAward {
            xp: amount,
            reason: reason.map(str::to_string),
            new_level: self.stats.level,
        })
    }

    // ========== 习惯、练习、技能、连续天数 ==========

    /// 完成一次习惯：计数 +1，奖励 10 XP
    pub fn complete_habit(&mut self) -> CoreResult<()> {
        self.stats.habits_completed += 1;
        self.add_xp(HABIT_XP, Some("Completed habit"))?;
        self.log_activity(ActivityKind::Habit, "Completed habit", "✅", Some(HABIT_XP))?;
        self.check_achievements()?;
        Ok(())
    }

    /// 记录练习时长，奖励 `floor(hours * 20)` XP
    ///
    /// # Errors
    /// 时长为负数、NaN 或无穷大时返回校验错误，状态不变。
    pub fn log_practice(&mut self, hours: f64) -> CoreResult<u64> {
        let reward = practice_reward(hours)
            .ok_or_else(|| CoreError::validation(format!("练习时长无效: {hours}")))?;

        self.stats.total_hours += hours;
        self.add_xp(reward, Some(&format!("Practiced for {hours} hours")))?;
        self.log_activity(
            ActivityKind::Skill,
            format!("Logged {hours}h practice"),
            "⏱️",
            Some(reward),
        )?;
        self.check_achievements()?;
        Ok(reward)
    }

    /// 开始追踪一个新技能
    pub fn track_skill(&mut self, name: &str) -> CoreResult<()> {
        self.stats.skills_completed += 1;
        self.log_activity(
            ActivityKind::Skill,
            format!("Started tracking {name}"),
            "🎯",
            None,
        )?;
        self.check_achievements()?;
        Ok(())
    }

    /// 设置当前连续天数（绝对值，不是增量）
    pub fn update_streak(&mut self, days: u32) -> CoreResult<()> {
        let previous = self.stats.current_streak;
        self.stats.current_streak = days;
        if days > self.stats.longest_streak {
            self.stats.longest_streak = days;
        }

        if days > previous {
            self.log_activity(
                ActivityKind::Streak,
                format!("{days} day streak"),
                "🔥",
                Some(u64::from(days)),
            )?;
        }

        self.check_achievements()?;
        self.save_stats()
    }

    // ========== 成就 ==========

    /// 扫描成就目录，解锁所有新满足条件的成就
    ///
    /// 每个成就只会解锁一次；奖励通过 `add_xp` 发放，可能继续触发升级和
    /// 嵌套的成就检查。返回本轮解锁的成就。
    pub fn check_achievements(&mut self) -> CoreResult<Vec<&'static Achievement>> {
        let mut unlocked_now = Vec::new();

        for achievement in ACHIEVEMENTS {
            if self.unlocked.iter().any(|id| id == achievement.id) {
                continue;
            }
            if !achievement.requirement.is_met(&self.stats) {
                continue;
            }

            self.unlocked.push(achievement.id.to_string());
            tracing::info!(id = achievement.id, xp_reward = achievement.xp_reward, "achievement unlocked");

            self.add_xp(
                achievement.xp_reward,
                Some(&format!("Achievement: {}", achievement.name)),
            )?;
            self.log_activity(
                ActivityKind::Achievement,
                format!("Unlocked {}", achievement.name),
                achievement.icon,
                Some(achievement.xp_reward),
            )?;
            unlocked_now.push(achievement);
        }

        self.save_stats()?;
        Ok(unlocked_now)
    }

    // ========== 活动日志 ==========

    /// 追加一条活动记录（最新在前，最多保留 200 条）
    pub fn log_activity(
        &mut self,
        kind: ActivityKind,
        description: impl Into<String>,
        icon: &str,
        value: Option<u64>,
    ) -> CoreResult<()> {
        let entry = ActivityLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            description: description.into(),
            icon: icon.to_string(),
            value,
            timestamp: self.clock.now(),
        };

        let mut log = Vec::with_capacity(ACTIVITY_LOG_CAPACITY);
        log.push(entry);
        log.extend(
            self.activity_log
                .iter()
                .take(ACTIVITY_LOG_CAPACITY - 1)
                .cloned(),
        );
        self.store.save(slots::ACTIVITY_LOG, &log)?;
        self.activity_log = log;
        Ok(())
    }

    // ========== 目标 ==========

    /// 设置每日/每周 XP 目标
    pub fn set_goals(&mut self, daily_xp: u64, weekly_xp: u64) -> CoreResult<()> {
        if daily_xp == 0 || weekly_xp == 0 {
            return Err(CoreError::validation("XP 目标必须大于 0"));
        }

        self.goals = Goals {
            daily_xp,
            weekly_xp,
        };
        self.store.save(slots::GOALS, &self.goals)?;
        Ok(())
    }

    // ========== 持久化 ==========

    fn save_stats(&self) -> CoreResult<()> {
        self.store.save(slots::STATS, &self.stats)?;
        self.store.save(slots::UNLOCKED_ACHIEVEMENTS, &self.unlocked)?;
        Ok(())
    }

    fn save_learning_entries(&self) -> CoreResult<()> {
        self.store.save(slots::LEARNING_ENTRIES, &self.learning_entries)?;
        Ok(())
    }

    fn save_habit_tracking(&self) -> CoreResult<()> {
        self.store.save(slots::HABIT_TRACKING, &self.habit_tracking)?;
        Ok(())
    }

    /// 清空内存状态并删除全部进度键
    pub(crate) fn reset(&mut self) -> CoreResult<()> {
        self.stats = Stats::default();
        self.unlocked.clear();
        self.activity_log.clear();
        self.goals = Goals::default();
        self.learning_entries.clear();
        self.habit_tracking.clear();

        self.store.clear(slots::STATS)?;
        self.store.clear(slots::UNLOCKED_ACHIEVEMENTS)?;
        self.store.clear(slots::ACTIVITY_LOG)?;
        self.store.clear(slots::GOALS)?;
        self.store.clear(slots::LEARNING_ENTRIES)?;
        self.store.clear(slots::HABIT_TRACKING)?;
        Ok(())
    }
}
