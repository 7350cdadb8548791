//! 学习日志：新增、按技能筛选、删除、搜索。没有原地更新操作。

use upgem_algo::sanitize::{clamp_energy, contains_ignore_case, normalize_tags};
use upgem_algo::LearningEntry;

use super::ProgressionEngine;
use crate::error::{CoreError, CoreResult};
use crate::models::NewLearningEntry;

impl ProgressionEngine {
    /// 新增学习日志（插入到最前面）
    pub fn add_learning_entry(&mut self, new: NewLearningEntry) -> CoreResult<LearningEntry> {
        if new.skill_id.trim().is_empty() {
            return Err(CoreError::validation("skillId 不能为空"));
        }

        let entry = LearningEntry {
            id: uuid::Uuid::new_v4().to_string(),
            skill_id: new.skill_id,
            date: new.date,
            lesson: new.lesson,
            mood: new.mood,
            energy_before: clamp_energy(new.energy_before),
            energy_after: clamp_energy(new.energy_after),
            focus_level: new.focus_level,
            session_details: new.session_details,
            tags: normalize_tags(&new.tags),
        };

        self.learning_entries.insert(0, entry.clone());
        self.save_learning_entries()?;
        Ok(entry)
    }

    /// 某个技能的全部日志
    pub fn learning_entries_for_skill(&self, skill_id: &str) -> Vec<&LearningEntry> {
        self.learning_entries
            .iter()
            .filter(|e| e.skill_id == skill_id)
            .collect()
    }

    /// 按 id 删除，返回是否删除了记录
    pub fn delete_learning_entry(&mut self, id: &str) -> CoreResult<bool> {
        let before = self.learning_entries.len();
        self.learning_entries.retain(|e| e.id != id);
        let removed = self.learning_entries.len() != before;

        self.save_learning_entries()?;
        Ok(removed)
    }

    /// 在课程内容和标签中做大小写无关的子串搜索
    pub fn search_learning_entries(&self, query: &str) -> Vec<&LearningEntry> {
        let q = query.to_lowercase();
        self.learning_entries
            .iter()
            .filter(|e| {
                contains_ignore_case(&e.lesson, &q)
                    || e.tags.iter().any(|t| contains_ignore_case(t, &q))
            })
            .collect()
    }
}
