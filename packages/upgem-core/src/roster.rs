//! 技能与习惯名录
//!
//! 提供技能/习惯记录的增删改查，每次变更后写入 `skills` / `habits` 键。

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use upgem_algo::sanitize::{is_valid_hours, MAX_PROFICIENCY};

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::models::{Habit, HabitFrequency, NewHabit, NewSkill, Skill, SkillUpdate};
use crate::storage::{slots, TypedStore};

pub struct Roster {
    store: TypedStore,
    clock: Arc<dyn Clock>,
    skills: Vec<Skill>,
    habits: Vec<Habit>,
}

impl Roster {
    pub fn open(store: TypedStore, clock: Arc<dyn Clock>) -> CoreResult<Self> {
        Ok(Self {
            skills: store.load_or_default(slots::SKILLS)?,
            habits: store.load_or_default(slots::HABITS)?,
            store,
            clock,
        })
    }

    // ========== 技能 ==========

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// 创建技能
    ///
    /// # Errors
    /// 名称为空或熟练度超过 100 时返回校验错误。
    pub fn create_skill(&mut self, new: NewSkill) -> CoreResult<Skill> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("技能名称不能为空"));
        }
        validate_proficiency(new.proficiency_level)?;

        let now = self.clock.now();
        let skill = Skill {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: new.category,
            proficiency_level: new.proficiency_level,
            total_hours: 0.0,
            description: new.description,
            image_url: new.image_url,
            custom_icon: new.custom_icon,
            created_at: Some(now),
            updated_at: Some(now),
        };

        self.skills.push(skill.clone());
        self.save_skills()?;
        tracing::debug!(id = %skill.id, name = %skill.name, "skill created");
        Ok(skill)
    }

    /// 部分更新技能
    pub fn update_skill(&mut self, id: &str, update: SkillUpdate) -> CoreResult<Skill> {
        if let Some(level) = update.proficiency_level {
            validate_proficiency(level)?;
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CoreError::validation("技能名称不能为空"));
        }

        let now = self.clock.now();
        let skill = self
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(format!("skill {id}")))?;

        if let Some(name) = update.name {
            skill.name = name.trim().to_string();
        }
        if let Some(category) = update.category {
            skill.category = category;
        }
        if let Some(level) = update.proficiency_level {
            skill.proficiency_level = level;
        }
        if update.description.is_some() {
            skill.description = update.description;
        }
        if update.image_url.is_some() {
            skill.image_url = update.image_url;
        }
        if update.custom_icon.is_some() {
            skill.custom_icon = update.custom_icon;
        }
        skill.updated_at = Some(now);

        let updated = skill.clone();
        self.save_skills()?;
        Ok(updated)
    }

    /// 累加练习时长
    pub fn add_skill_hours(&mut self, id: &str, hours: f64) -> CoreResult<Skill> {
        if !is_valid_hours(hours) {
            return Err(CoreError::validation(format!("练习时长无效: {hours}")));
        }

        let now = self.clock.now();
        let skill = self
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(format!("skill {id}")))?;
        skill.total_hours += hours;
        skill.updated_at = Some(now);

        let updated = skill.clone();
        self.save_skills()?;
        Ok(updated)
    }

    pub fn delete_skill(&mut self, id: &str) -> CoreResult<bool> {
        let before = self.skills.len();
        self.skills.retain(|s| s.id != id);
        let removed = self.skills.len() != before;
        self.save_skills()?;
        Ok(removed)
    }

    /// 用合并后的列表整体替换（备份恢复）
    pub(crate) fn replace_skills(&mut self, skills: Vec<Skill>) -> CoreResult<()> {
        self.skills = skills;
        self.save_skills()
    }

    // ========== 习惯 ==========

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// 创建习惯
    pub fn create_habit(&mut self, new: NewHabit) -> CoreResult<Habit> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("习惯名称不能为空"));
        }

        let habit = Habit {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: new.description,
            frequency: new.frequency,
            streak_count: 0,
            best_streak: 0,
            created_at: Some(self.clock.now()),
            last_completed: None,
        };

        self.habits.push(habit.clone());
        self.save_habits()?;
        Ok(habit)
    }

    pub fn delete_habit(&mut self, id: &str) -> CoreResult<bool> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        let removed = self.habits.len() != before;
        self.save_habits()?;
        Ok(removed)
    }

    /// 记录一次习惯完成并更新连续周期
    ///
    /// 与上次完成处于同一周期时连续数不变；处于紧接着的下一个周期时 +1；
    /// 否则重置为 1。
    pub fn log_habit_completion(&mut self, id: &str, at: DateTime<Utc>) -> CoreResult<Habit> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::not_found(format!("habit {id}")))?;

        let current = period_start(habit.frequency, at.date_naive());
        habit.streak_count = match habit.last_completed {
            Some(last) => {
                let last = period_start(habit.frequency, last.date_naive());
                if last == current {
                    habit.streak_count.max(1)
                } else if previous_period_start(habit.frequency, current) == last {
                    habit.streak_count + 1
                } else {
                    1
                }
            }
            None => 1,
        };
        habit.best_streak = habit.best_streak.max(habit.streak_count);
        habit.last_completed = Some(at);

        let updated = habit.clone();
        self.save_habits()?;
        tracing::debug!(id = %updated.id, streak = updated.streak_count, "habit completed");
        Ok(updated)
    }

    /// 所有习惯中最长的仍然有效的连续数
    ///
    /// 上次完成既不在 `today` 所在周期、也不在上一个周期的习惯已经断签，按 0 计。
    pub fn max_current_streak(&self, today: NaiveDate) -> u32 {
        self.habits
            .iter()
            .map(|h| live_streak(h, today))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn replace_habits(&mut self, habits: Vec<Habit>) -> CoreResult<()> {
        self.habits = habits;
        self.save_habits()
    }

    pub(crate) fn reset(&mut self) -> CoreResult<()> {
        self.skills.clear();
        self.habits.clear();
        self.store.clear(slots::SKILLS)?;
        self.store.clear(slots::HABITS)?;
        Ok(())
    }

    // ========== 持久化 ==========

    fn save_skills(&self) -> CoreResult<()> {
        self.store.save(slots::SKILLS, &self.skills)?;
        Ok(())
    }

    fn save_habits(&self) -> CoreResult<()> {
        self.store.save(slots::HABITS, &self.habits)?;
        Ok(())
    }
}

fn validate_proficiency(level: u8) -> CoreResult<()> {
    if level > MAX_PROFICIENCY {
        return Err(CoreError::validation(format!(
            "熟练度必须在 0-{MAX_PROFICIENCY} 之间: {level}"
        )));
    }
    Ok(())
}

fn live_streak(habit: &Habit, today: NaiveDate) -> u32 {
    let Some(last) = habit.last_completed else {
        return 0;
    };
    let current = period_start(habit.frequency, today);
    let last = period_start(habit.frequency, last.date_naive());
    if last == current || last == previous_period_start(habit.frequency, current) {
        habit.streak_count
    } else {
        0
    }
}

/// 日期所在周期的第一天（周从周一开始）
fn period_start(frequency: HabitFrequency, date: NaiveDate) -> NaiveDate {
    match frequency {
        HabitFrequency::Daily => date,
        HabitFrequency::Weekly => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        HabitFrequency::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// 上一个周期的第一天
fn previous_period_start(frequency: HabitFrequency, start: NaiveDate) -> NaiveDate {
    match frequency {
        HabitFrequency::Daily => start - Duration::days(1),
        HabitFrequency::Weekly => start - Duration::days(7),
        HabitFrequency::Monthly => period_start(frequency, start - Duration::days(1)),
    }
}
