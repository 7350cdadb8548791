//! Common Types and Constants
//!
//! Shared data structures used across all progression modules. Field names keep the
//! camelCase JSON layout of the persisted records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// XP cost of level 1
pub const BASE_LEVEL_XP: f64 = 100.0;

/// Growth factor between consecutive level costs
pub const LEVEL_GROWTH: f64 = 1.5;

/// Maximum number of activity log entries kept (newest first)
pub const ACTIVITY_LOG_CAPACITY: usize = 200;

/// XP awarded for one completed habit
pub const HABIT_XP: u64 = 10;

/// XP awarded per practiced hour
pub const XP_PER_PRACTICE_HOUR: f64 = 20.0;

/// Default daily XP goal
pub const DEFAULT_DAILY_XP_GOAL: u64 = 150;

/// Default weekly XP goal
pub const DEFAULT_WEEKLY_XP_GOAL: u64 = 750;

/// Default heatmap window in days
pub const DEFAULT_HEATMAP_DAYS: u32 = 365;

/// Largest heatmap window the engine will build
pub const MAX_HEATMAP_DAYS: u32 = DEFAULT_HEATMAP_DAYS * 10;

/// Window used by the velocity metric
pub const VELOCITY_WINDOW_DAYS: i64 = 14;

/// Window used by the consistency metric
pub const CONSISTENCY_WINDOW_DAYS: i64 = 30;

// ==================== Stats ====================

/// Aggregate progression counters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_hours: f64,
    pub skills_completed: u32,
    pub habits_completed: u32,
    pub daily_goals_met: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            total_hours: 0.0,
            skills_completed: 0,
            habits_completed: 0,
            daily_goals_met: 0,
        }
    }
}

/// XP thresholds used for progress display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(rename = "dailyXP")]
    pub daily_xp: u64,
    #[serde(rename = "weeklyXP")]
    pub weekly_xp: u64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily_xp: DEFAULT_DAILY_XP_GOAL,
            weekly_xp: DEFAULT_WEEKLY_XP_GOAL,
        }
    }
}

// ==================== Activity Log ====================

/// Activity category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Xp,
    Skill,
    Habit,
    Achievement,
    Streak,
}

/// One immutable activity log record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

// ==================== Learning Journal ====================

/// Self-reported mood after a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Poor,
    Okay,
    Good,
    Excellent,
}

/// Self-reported focus during a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusLevel {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poor" => Ok(Self::Poor),
            "okay" => Ok(Self::Okay),
            "good" => Ok(Self::Good),
            "excellent" => Ok(Self::Excellent),
            other => Err(format!("unknown mood '{other}' (poor, okay, good, excellent)")),
        }
    }
}

impl std::str::FromStr for FocusLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown focus level '{other}' (low, medium, high)")),
        }
    }
}

/// Learning journal record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningEntry {
    pub id: String,
    pub skill_id: String,
    pub date: NaiveDate,
    pub lesson: String,
    pub mood: Mood,
    pub energy_before: u8,
    pub energy_after: u8,
    pub focus_level: FocusLevel,
    #[serde(default)]
    pub session_details: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ==================== Habit Tracking ====================

/// Per-(skill, day) completion marker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitTracking {
    pub date: NaiveDate,
    pub skill_id: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<u8>,
}

// ==================== Achievements ====================

/// Which stat an achievement is measured against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    Skills,
    Habits,
    Streak,
    Hours,
    Level,
}

/// Single-field threshold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Requirement {
    #[serde(rename = "type")]
    pub kind: RequirementKind,
    pub value: u32,
}

/// Static catalog entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: u64,
    pub requirement: Requirement,
}

/// Catalog entry together with its unlock state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: Achievement,
    pub unlocked: bool,
}
