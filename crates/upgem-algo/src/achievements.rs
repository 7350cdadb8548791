//! Achievement Catalog
//!
//! Static milestone definitions and the single-field eligibility check.

use crate::types::{Achievement, AchievementStatus, Requirement, RequirementKind, Stats};

const fn entry(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    xp_reward: u64,
    kind: RequirementKind,
    value: u32,
) -> Achievement {
    Achievement {
        id,
        name,
        description,
        icon,
        xp_reward,
        requirement: Requirement { kind, value },
    }
}

use RequirementKind::{Habits, Hours, Level, Skills, Streak};

/// Full catalog, in evaluation order
pub static ACHIEVEMENTS: &[Achievement] = &[
    // Skill milestones
    entry("first-skill", "First Steps", "Add your first skill", "🎯", 50, Skills, 1),
    entry("skill-collector", "Skill Collector", "Track 5 skills", "📚", 100, Skills, 5),
    entry("skill-master", "Skill Master", "Track 10 skills", "🏆", 250, Skills, 10),
    entry("skill-polymath", "Polymath", "Track 15 skills", "🧠", 500, Skills, 15),
    entry("skill-legend", "Skill Legend", "Track 20 skills", "👑", 1000, Skills, 20),
    // Habit milestones
    entry("habit-starter", "Habit Starter", "Complete your first habit", "✅", 50, Habits, 1),
    entry("habit-builder", "Habit Builder", "Complete 50 habits", "💪", 200, Habits, 50),
    entry("habit-warrior", "Habit Warrior", "Complete 200 habits", "⚔️", 500, Habits, 200),
    entry("habit-legend", "Habit Legend", "Complete 500 habits", "🏅", 1500, Habits, 500),
    // Streak milestones
    entry("week-warrior", "Week Warrior", "7 day streak", "🔥", 150, Streak, 7),
    entry("month-master", "Month Master", "30 day streak", "⚡", 500, Streak, 30),
    entry("perfect-quarter", "Perfect Quarter", "90 day streak", "💫", 750, Streak, 90),
    entry("century-club", "Century Club", "100 day streak", "👑", 1000, Streak, 100),
    entry("year-round", "Year Round", "365 day streak", "🌍", 5000, Streak, 365),
    // Time investment milestones
    entry("time-investor", "Time Investor", "Practice for 10 hours", "⏰", 100, Hours, 10),
    entry("dedicated", "Dedicated", "Practice for 100 hours", "🌟", 500, Hours, 100),
    entry("thousand-hour", "Thousand Hour Club", "Practice for 1000 hours", "🎖️", 2000, Hours, 1000),
    entry("lifelong-learner", "Lifelong Learner", "Practice for 5000 hours", "📖", 5000, Hours, 5000),
    // Level milestones
    entry("level-5", "Rising Star", "Reach level 5", "⭐", 100, Level, 5),
    entry("level-10", "Pro Player", "Reach level 10", "💎", 300, Level, 10),
    entry("level-20", "Master", "Reach level 20", "🏆", 1000, Level, 20),
    entry("level-30", "Grandmaster", "Reach level 30", "👑", 2000, Level, 30),
    entry("level-50", "Legend", "Reach level 50", "✨", 5000, Level, 50),
    // Special
    entry("speedrunner", "Speedrunner", "Reach level 5 in under 1 week", "🚀", 300, Level, 5),
    entry("night-owl", "Night Owl", "Log a habit at midnight", "🌙", 50, Habits, 1),
];

impl Requirement {
    /// 当前统计是否满足阈值
    pub fn is_met(&self, stats: &Stats) -> bool {
        let threshold = self.value;
        match self.kind {
            RequirementKind::Skills => stats.skills_completed >= threshold,
            RequirementKind::Habits => stats.habits_completed >= threshold,
            RequirementKind::Streak => stats.current_streak >= threshold,
            RequirementKind::Hours => stats.total_hours >= f64::from(threshold),
            RequirementKind::Level => stats.level >= threshold,
        }
    }

    /// 当前值相对阈值的进度百分比
    pub fn progress(&self, stats: &Stats) -> f64 {
        let current = match self.kind {
            RequirementKind::Skills => f64::from(stats.skills_completed),
            RequirementKind::Habits => f64::from(stats.habits_completed),
            RequirementKind::Streak => f64::from(stats.current_streak),
            RequirementKind::Hours => stats.total_hours,
            RequirementKind::Level => f64::from(stats.level),
        };
        if self.value == 0 {
            return 100.0;
        }
        (current / f64::from(self.value) * 100.0).min(100.0)
    }
}

/// 按 id 查找成就
pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// 满足条件但尚未解锁的成就，保持目录顺序
pub fn newly_eligible<'a>(
    stats: &'a Stats,
    unlocked: &'a [String],
) -> impl Iterator<Item = &'static Achievement> + 'a {
    ACHIEVEMENTS
        .iter()
        .filter(move |a| !unlocked.iter().any(|id| id == a.id))
        .filter(move |a| a.requirement.is_met(stats))
}

/// 目录中每个成就及其解锁状态
pub fn with_status(unlocked: &[String]) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|a| AchievementStatus {
            achievement: *a,
            unlocked: unlocked.iter().any(|id| id == a.id),
        })
        .collect()
}
