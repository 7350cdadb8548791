//! 派生指标。每次访问时重新计算，不做缓存。

use serde::Serialize;
use upgem_algo::analytics::{
    consistency_score, focus_index, goal_progress, velocity, xp_in_trailing_week, xp_on_day,
};
use upgem_algo::leveling::level_progress;
use upgem_algo::{AchievementStatus, Goals, Stats};

use super::ProgressionEngine;

/// 仪表盘所需的全部数值
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: Stats,
    pub goals: Goals,
    pub current_level_xp: u64,
    pub xp_to_next_level: u64,
    pub level_progress: f64,
    pub xp_today: u64,
    pub xp_this_week: u64,
    pub daily_progress: f64,
    pub weekly_progress: f64,
    pub velocity: f64,
    pub consistency_score: u32,
    pub focus_index: u32,
    pub unlocked_achievements: usize,
    pub total_achievements: usize,
    pub next_achievement: Option<AchievementStatus>,
}

impl ProgressionEngine {
    /// 当前等级进度百分比 (0-100)
    pub fn level_progress(&self) -> f64 {
        level_progress(self.stats.total_xp, self.stats.level)
    }

    /// 每周学习日志条数（最近 14 天 / 2）
    pub fn velocity(&self) -> f64 {
        velocity(&self.learning_entries, self.clock.today())
    }

    pub fn consistency_score(&self) -> u32 {
        consistency_score(&self.learning_entries, self.clock.today())
    }

    pub fn focus_index(&self) -> u32 {
        focus_index(&self.learning_entries, self.stats.skills_completed)
    }

    pub fn xp_today(&self) -> u64 {
        xp_on_day(&self.activity_log, self.clock.today())
    }

    pub fn xp_this_week(&self) -> u64 {
        xp_in_trailing_week(&self.activity_log, self.clock.today())
    }

    pub fn daily_progress(&self) -> f64 {
        goal_progress(self.xp_today(), self.goals.daily_xp)
    }

    pub fn weekly_progress(&self) -> f64 {
        goal_progress(self.xp_this_week(), self.goals.weekly_xp)
    }

    pub fn dashboard(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            stats: self.stats.clone(),
            goals: self.goals.clone(),
            current_level_xp: self.current_level_xp(),
            xp_to_next_level: self.xp_to_next_level(),
            level_progress: self.level_progress(),
            xp_today: self.xp_today(),
            xp_this_week: self.xp_this_week(),
            daily_progress: self.daily_progress(),
            weekly_progress: self.weekly_progress(),
            velocity: self.velocity(),
            consistency_score: self.consistency_score(),
            focus_index: self.focus_index(),
            unlocked_achievements: self.unlocked.len(),
            total_achievements: upgem_algo::ACHIEVEMENTS.len(),
            next_achievement: self.next_achievement(),
        }
    }
}
