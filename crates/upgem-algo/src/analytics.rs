//! 学习分析
//!
//! 基于学习日志、活动日志和打卡记录的只读派生指标。所有函数都是纯函数，
//! "今天" 由调用方传入，日历日按 UTC 计算。

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};

use crate::types::{
    ActivityKind, ActivityLogEntry, HabitTracking, LearningEntry, CONSISTENCY_WINDOW_DAYS,
    VELOCITY_WINDOW_DAYS,
};

/// 以 `today` 结尾、长度为 `days` 的日期窗口是否包含 `date`
fn within_trailing_days(date: NaiveDate, today: NaiveDate, days: i64) -> bool {
    let start = today - Duration::days(days - 1);
    date >= start && date <= today
}

/// 学习速度：最近 14 天内的日志条数 / 2（约等于每周条数）
pub fn velocity(entries: &[LearningEntry], today: NaiveDate) -> f64 {
    let recent = entries
        .iter()
        .filter(|e| within_trailing_days(e.date, today, VELOCITY_WINDOW_DAYS))
        .count();
    // n / 2 只可能是 x.0 或 x.5，天然保留一位小数
    recent as f64 / 2.0
}

/// 一致性得分：最近 30 天中有日志的天数占比（0-100，四舍五入）
pub fn consistency_score(entries: &[LearningEntry], today: NaiveDate) -> u32 {
    if entries.is_empty() {
        return 0;
    }

    let active_days: HashSet<NaiveDate> = entries
        .iter()
        .map(|e| e.date)
        .filter(|d| within_trailing_days(*d, today, CONSISTENCY_WINDOW_DAYS))
        .collect();

    (active_days.len() as f64 / CONSISTENCY_WINDOW_DAYS as f64 * 100.0).round() as u32
}

/// 专注指数：条目最多的技能占全部条目的百分比
///
/// 尚未追踪任何技能时为 0。
pub fn focus_index(entries: &[LearningEntry], skills_completed: u32) -> u32 {
    if skills_completed == 0 || entries.is_empty() {
        return 0;
    }

    let mut per_skill: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *per_skill.entry(entry.skill_id.as_str()).or_insert(0) += 1;
    }
    let max_entries = per_skill.values().copied().max().unwrap_or(0);

    (max_entries as f64 / entries.len() as f64 * 100.0).round() as u32
}

/// 某一日历日获得的 XP
pub fn xp_on_day(log: &[ActivityLogEntry], day: NaiveDate) -> u64 {
    log.iter()
        .filter(|a| a.kind == ActivityKind::Xp && a.timestamp.date_naive() == day)
        .map(|a| a.value.unwrap_or(0))
        .sum()
}

/// 最近 7 天（含今天，从 6 天前的 00:00 起）获得的 XP
pub fn xp_in_trailing_week(log: &[ActivityLogEntry], today: NaiveDate) -> u64 {
    let start_day = today - Duration::days(6);
    let start: DateTime<Utc> = start_day.and_time(NaiveTime::MIN).and_utc();
    log.iter()
        .filter(|a| a.kind == ActivityKind::Xp && a.timestamp >= start)
        .map(|a| a.value.unwrap_or(0))
        .sum()
}

/// 目标完成百分比，上限 100；目标为 0 时视为已完成
pub fn goal_progress(value: u64, goal: u64) -> f64 {
    if goal == 0 {
        return 100.0;
    }
    (value as f64 / goal as f64 * 100.0).min(100.0)
}

/// 打卡热力图：以 `today` 结尾的 `days` 天内，每天该技能的完成记录数
///
/// 窗口在 `NaiveDate::MIN` 处截断。
pub fn habit_heatmap(
    tracking: &[HabitTracking],
    skill_id: &str,
    today: NaiveDate,
    days: u32,
) -> BTreeMap<NaiveDate, u32> {
    let mut data: BTreeMap<NaiveDate, u32> = (0..u64::from(days))
        .map_while(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| (date, 0))
        .collect();

    for record in tracking
        .iter()
        .filter(|h| h.completed && h.skill_id == skill_id)
    {
        if let Some(count) = data.get_mut(&record.date) {
            *count += 1;
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FocusLevel, Mood};
    use chrono::TimeZone;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(skill_id: &str, date: NaiveDate) -> LearningEntry {
        LearningEntry {
            id: format!("{skill_id}-{date}"),
            skill_id: skill_id.to_string(),
            date,
            lesson: "lesson".to_string(),
            mood: Mood::Good,
            energy_before: 3,
            energy_after: 4,
            focus_level: FocusLevel::High,
            session_details: String::new(),
            tags: vec![],
        }
    }

    fn xp_activity(value: u64, at: DateTime<Utc>) -> ActivityLogEntry {
        ActivityLogEntry {
            id: at.to_rfc3339(),
            kind: ActivityKind::Xp,
            description: "xp".to_string(),
            icon: "⚡".to_string(),
            value: Some(value),
            timestamp: at,
        }
    }

    #[test]
    fn test_velocity_window() {
        let today = day("2024-03-20");
        let entries = vec![
            entry("a", today),
            entry("a", today - Duration::days(13)),
            entry("a", today - Duration::days(14)),
            entry("b", today - Duration::days(3)),
        ];
        assert_eq!(velocity(&entries, today), 1.5);
        assert_eq!(velocity(&[], today), 0.0);
    }

    #[test]
    fn test_consistency_score_ten_days() {
        let today = day("2024-03-20");
        let mut entries: Vec<_> = (0..10)
            .map(|i| entry("a", today - Duration::days(i * 2)))
            .collect();
        // 同一天的重复条目只算一次
        entries.push(entry("b", today));
        // 窗口外的条目不计入
        entries.push(entry("a", today - Duration::days(30)));
        assert_eq!(consistency_score(&entries, today), 33);
    }

    #[test]
    fn test_consistency_score_empty() {
        assert_eq!(consistency_score(&[], day("2024-03-20")), 0);
    }

    #[test]
    fn test_focus_index() {
        let today = day("2024-03-20");
        let entries = vec![
            entry("a", today),
            entry("a", today),
            entry("a", today),
            entry("b", today),
        ];
        assert_eq!(focus_index(&entries, 2), 75);
        assert_eq!(focus_index(&entries, 0), 0);
        assert_eq!(focus_index(&[], 3), 0);
    }

    #[test]
    fn test_xp_today_and_week() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let today = now.date_naive();
        let mut log = vec![
            xp_activity(10, now),
            xp_activity(20, now - Duration::hours(13)),
            xp_activity(40, Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap()),
            xp_activity(80, Utc.with_ymd_and_hms(2024, 3, 13, 23, 59, 59).unwrap()),
        ];
        log.push(ActivityLogEntry {
            kind: ActivityKind::Habit,
            ..xp_activity(1000, now)
        });

        assert_eq!(xp_on_day(&log, today), 10);
        assert_eq!(xp_in_trailing_week(&log, today), 70);
    }

    #[test]
    fn test_goal_progress() {
        assert_eq!(goal_progress(75, 150), 50.0);
        assert_eq!(goal_progress(300, 150), 100.0);
        assert_eq!(goal_progress(0, 0), 100.0);
    }

    #[test]
    fn test_habit_heatmap() {
        let today = day("2024-01-10");
        let tracking = vec![
            HabitTracking {
                date: day("2024-01-09"),
                skill_id: "s1".to_string(),
                completed: true,
                hours: None,
                energy: None,
            },
            HabitTracking {
                date: day("2024-01-08"),
                skill_id: "s1".to_string(),
                completed: false,
                hours: None,
                energy: None,
            },
            HabitTracking {
                date: day("2024-01-09"),
                skill_id: "s2".to_string(),
                completed: true,
                hours: None,
                energy: None,
            },
        ];

        let map = habit_heatmap(&tracking, "s1", today, 3);
        let values: Vec<_> = map.iter().map(|(d, c)| (d.to_string(), *c)).collect();
        assert_eq!(
            values,
            vec![
                ("2024-01-08".to_string(), 0),
                ("2024-01-09".to_string(), 1),
                ("2024-01-10".to_string(), 0),
            ]
        );
        assert!(habit_heatmap(&tracking, "s1", today, 0).is_empty());
    }

    #[test]
    fn test_habit_heatmap_stops_at_min_date() {
        let today = NaiveDate::MIN + Duration::days(2);
        let data = habit_heatmap(&[], "s1", today, u32::MAX);
        assert_eq!(data.len(), 3);
        assert_eq!(data.keys().next(), Some(&NaiveDate::MIN));
        assert!(habit_heatmap(&[], "s1", today, 0).is_empty());
    }
}
