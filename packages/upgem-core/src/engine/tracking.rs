//! 按 (skillId, date) 的打卡记录与热力图

use std::collections::BTreeMap;

use chrono::NaiveDate;
use upgem_algo::analytics::habit_heatmap;
use upgem_algo::{HabitTracking, MAX_HEATMAP_DAYS};

use super::ProgressionEngine;
use crate::error::{CoreError, CoreResult};

impl ProgressionEngine {
    /// 记录一次完成（同一技能同一天最多一条记录）
    ///
    /// `date` 缺省为今天。
    pub fn record_habit_completion(
        &mut self,
        skill_id: &str,
        date: Option<NaiveDate>,
    ) -> CoreResult<()> {
        let date = date.unwrap_or_else(|| self.clock.today());

        match self
            .habit_tracking
            .iter_mut()
            .find(|h| h.skill_id == skill_id && h.date == date)
        {
            Some(existing) => existing.completed = true,
            None => self.habit_tracking.push(HabitTracking {
                date,
                skill_id: skill_id.to_string(),
                completed: true,
                hours: None,
                energy: None,
            }),
        }

        self.save_habit_tracking()
    }

    /// 以今天结尾的 `days` 天热力图
    ///
    /// # Errors
    /// `days` 超过 `MAX_HEATMAP_DAYS` 时返回校验错误。
    pub fn habit_heatmap(&self, skill_id: &str, days: u32) -> CoreResult<BTreeMap<NaiveDate, u32>> {
        if days > MAX_HEATMAP_DAYS {
            return Err(CoreError::validation(format!(
                "热力图天数不能超过 {MAX_HEATMAP_DAYS}: {days}"
            )));
        }
        Ok(habit_heatmap(
            &self.habit_tracking,
            skill_id,
            self.clock.today(),
            days,
        ))
    }
}
