//! 数据模型定义
//!
//! 名录中的技能与习惯记录，以及各类创建/更新请求。进度相关的记录类型
//! （Stats、日志条目等）定义在 `upgem-algo` 中。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use upgem_algo::sanitize::MAX_PROFICIENCY;
use upgem_algo::{FocusLevel, Mood};

// ============================================================
// Skill - 技能
// ============================================================

/// 技能分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SkillCategory {
    Programming,
    Design,
    Languages,
    Music,
    Fitness,
    Business,
    Art,
    Science,
    Writing,
    Speaking,
    Leadership,
    Negotiation,
    Cooking,
    Sports,
    Health,
    #[default]
    Other,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 16] = [
        Self::Programming,
        Self::Design,
        Self::Languages,
        Self::Music,
        Self::Fitness,
        Self::Business,
        Self::Art,
        Self::Science,
        Self::Writing,
        Self::Speaking,
        Self::Leadership,
        Self::Negotiation,
        Self::Cooking,
        Self::Sports,
        Self::Health,
        Self::Other,
    ];

    /// 大小写无关解析，未知分类归为 Other
    pub fn parse(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| format!("{c:?}").eq_ignore_ascii_case(s.trim()))
            .unwrap_or(Self::Other)
    }
}

/// 追踪中的技能
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    /// 技能唯一标识 (UUID)
    pub id: String,
    /// 技能名称
    pub name: String,
    /// 分类
    #[serde(default)]
    pub category: SkillCategory,
    /// 熟练度 (0-100)，任意数字四舍五入并截断到该区间
    #[serde(default, deserialize_with = "deserialize_proficiency")]
    pub proficiency_level: u8,
    /// 累计练习时长（小时）
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 图片 URL 或 base64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// emoji 图标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    /// 旧备份可能缺少时间戳，导入时补为当前时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn deserialize_proficiency<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    // JSON 中不会出现 NaN
    Ok(raw.round().clamp(0.0, f64::from(MAX_PROFICIENCY)) as u8)
}

/// 创建技能请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default)]
    pub proficiency_level: u8,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub custom_icon: Option<String>,
}

/// 部分更新，None 字段保持不变
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillUpdate {
    pub name: Option<String>,
    pub category: Option<SkillCategory>,
    pub proficiency_level: Option<u8>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub custom_icon: Option<String>,
}

// ============================================================
// Habit - 习惯
// ============================================================

/// 习惯频率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl std::str::FromStr for HabitFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!(
                "无效的频率 '{other}'，必须是 daily、weekly 或 monthly"
            )),
        }
    }
}

/// 追踪中的习惯
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: HabitFrequency,
    /// 当前连续周期数
    #[serde(default)]
    pub streak_count: u32,
    /// 历史最长连续周期数
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<DateTime<Utc>>,
}

/// 创建习惯请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub frequency: HabitFrequency,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================
// Learning journal - 学习日志
// ============================================================

/// 新增学习日志请求（id 由引擎生成）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLearningEntry {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_category_parse() {
        assert_eq!(SkillCategory::parse("programming"), SkillCategory::Programming);
        assert_eq!(SkillCategory::parse(" Music "), SkillCategory::Music);
        assert_eq!(SkillCategory::parse("juggling"), SkillCategory::Other);
    }

    #[test]
    fn test_habit_frequency_from_str() {
        assert_eq!("Weekly".parse::<HabitFrequency>(), Ok(HabitFrequency::Weekly));
        assert!("yearly".parse::<HabitFrequency>().is_err());
    }

    #[test]
    fn test_skill_deserialize_with_defaults() {
        let json = r#"{
            "id": "1700000000000",
            "name": "Rust",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let skill: Skill = serde_json::from_str(json).expect("Failed to parse skill");
        assert_eq!(skill.category, SkillCategory::Other);
        assert_eq!(skill.proficiency_level, 0);
        assert_eq!(skill.total_hours, 0.0);
        assert!(skill.created_at.is_some());
    }

    #[test]
    fn test_skill_proficiency_accepts_any_number() {
        let parse = |level: &str| {
            let json = format!(r#"{{"id": "1", "name": "Rust", "proficiencyLevel": {level}}}"#);
            serde_json::from_str::<Skill>(&json)
                .expect("Failed to parse skill")
                .proficiency_level
        };
        assert_eq!(parse("42.5"), 43);
        assert_eq!(parse("40"), 40);
        assert_eq!(parse("250"), 100);
        assert_eq!(parse("-3"), 0);
    }

    #[test]
    fn test_skill_without_timestamps() {
        let skill: Skill =
            serde_json::from_str(r#"{"id": "1", "name": "Rust"}"#).expect("Failed to parse skill");
        assert!(skill.created_at.is_none());
        assert!(skill.updated_at.is_none());
    }
}
