//! 备份：JSON/CSV 导出、导入合并、清空全部数据
//!
//! 导入只合并技能和习惯；进度片段随导出一起写出，但不会被导入覆盖。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use upgem_algo::{ActivityLogEntry, Goals, HabitTracking, LearningEntry, Stats};

use crate::context::AppContext;
use crate::error::{CoreError, CoreResult};
use crate::models::{Habit, Skill};
use crate::storage::{slots, StorageError};

pub const BACKUP_VERSION: &str = "1.0.0";

/// 清空数据时必须输入的确认短语
pub const CLEAR_CONFIRMATION: &str = "DELETE";

// ============================================================
// 备份文档
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub exported: Option<DateTime<Utc>>,
    pub skills: Vec<Skill>,
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progression: Option<ProgressionSnapshot>,
}

/// 导出时附带的成长状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionSnapshot {
    pub stats: Stats,
    pub unlocked_achievements: Vec<String>,
    pub activity_log: Vec<ActivityLogEntry>,
    pub goals: Goals,
    pub learning_entries: Vec<LearningEntry>,
    pub habit_tracking: Vec<HabitTracking>,
}

fn default_version() -> String {
    BACKUP_VERSION.to_string()
}

/// 导入结果：合并后的记录数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub skills: usize,
    pub habits: usize,
}

/// 可以导出为 CSV 的表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvTable {
    Skills,
    Habits,
}

impl CsvTable {
    pub fn name(self) -> &'static str {
        match self {
            Self::Skills => "skills",
            Self::Habits => "habits",
        }
    }
}

// ============================================================
// 导出
// ============================================================

/// 当前全部数据的快照
pub fn snapshot(ctx: &AppContext) -> CoreResult<BackupDocument> {
    let engine = &ctx.engine;
    Ok(BackupDocument {
        version: default_version(),
        exported: Some(ctx.clock().now()),
        skills: ctx.roster.skills().to_vec(),
        habits: ctx.roster.habits().to_vec(),
        settings: ctx.store().load_or_default(slots::SETTINGS)?,
        progression: Some(ProgressionSnapshot {
            stats: engine.stats().clone(),
            unlocked_achievements: engine.unlocked_achievements().to_vec(),
            activity_log: engine.activity_log().to_vec(),
            goals: engine.goals().clone(),
            learning_entries: engine.learning_entries().to_vec(),
            habit_tracking: engine.habit_tracking().to_vec(),
        }),
    })
}

/// 导出为格式化 JSON
pub fn export_json(ctx: &AppContext) -> CoreResult<String> {
    let doc = snapshot(ctx)?;
    let text = serde_json::to_string_pretty(&doc).map_err(StorageError::from)?;
    tracing::info!(
        skills = doc.skills.len(),
        habits = doc.habits.len(),
        "backup exported"
    );
    Ok(text)
}

/// 把技能或习惯列表导出为 CSV
pub fn export_table_csv(ctx: &AppContext, table: CsvTable) -> CoreResult<String> {
    let records = match table {
        CsvTable::Skills => to_records(ctx.roster.skills())?,
        CsvTable::Habits => to_records(ctx.roster.habits())?,
    };
    export_csv(&records).map_err(|err| match err {
        CoreError::NothingToExport(_) => CoreError::NothingToExport(table.name().to_string()),
        other => other,
    })
}

fn to_records<T: Serialize>(items: &[T]) -> CoreResult<Vec<Value>> {
    items
        .iter()
        .map(|item| {
            serde_json::to_value(item).map_err(|e| CoreError::from(StorageError::from(e)))
        })
        .collect()
}

/// 把一组 JSON 对象写成 CSV
///
/// 表头是所有记录键的并集，按首次出现的顺序排列。非 null 的值一律加双引号，
/// 内部的双引号写成两个；对象和数组先序列化为 JSON；null 或缺失写为空。
pub fn export_csv(records: &[Value]) -> CoreResult<String> {
    if records.is_empty() {
        return Err(CoreError::NothingToExport("records".to_string()));
    }

    let mut header: Vec<&str> = Vec::new();
    for record in records {
        if let Some(object) = record.as_object() {
            for key in object.keys() {
                if !header.contains(&key.as_str()) {
                    header.push(key);
                }
            }
        }
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header.join(","));

    for record in records {
        let row: Vec<String> = header
            .iter()
            .map(|key| record.get(*key).map(csv_cell).unwrap_or_default())
            .collect();
        lines.push(row.join(","));
    }

    Ok(lines.join("\n"))
}

fn csv_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("\"{}\"", text.replace('"', "\"\""))
}

// ============================================================
// 导入
// ============================================================

/// 解析并校验备份文件
///
/// # Errors
/// - 不是合法 JSON：`InvalidBackup("备份文件解析失败 ...")`
/// - 缺少 `skills` 或 `habits` 数组：`InvalidBackup("备份文件格式无效 ...")`
/// - 某条记录无法解析：`InvalidBackup`，指出所在数组和下标
pub fn parse_backup(text: &str) -> CoreResult<BackupDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CoreError::InvalidBackup(format!("备份文件解析失败: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(CoreError::InvalidBackup(
            "备份文件格式无效: 顶层必须是对象".to_string(),
        ));
    };

    let skills: Vec<Skill> = parse_records(object, "skills")?;
    let habits: Vec<Habit> = parse_records(object, "habits")?;

    let version = object
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(default_version);
    let exported = object
        .get("exported")
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    let settings = object
        .get("settings")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let progression = match object.get("progression") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            serde_json::from_value(v.clone())
                .map_err(|e| CoreError::InvalidBackup(format!("progression 无效: {e}")))?,
        ),
    };

    Ok(BackupDocument {
        version,
        exported,
        skills,
        habits,
        settings,
        progression,
    })
}

fn parse_records<T: DeserializeOwned>(object: &Map<String, Value>, field: &str) -> CoreResult<Vec<T>> {
    let Some(items) = object.get(field).and_then(Value::as_array) else {
        return Err(CoreError::InvalidBackup(format!(
            "备份文件格式无效: 缺少 {field} 数组"
        )));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item.clone())
                .map_err(|e| CoreError::InvalidBackup(format!("{field}[{index}] 无效: {e}")))
        })
        .collect()
}

/// 按 id 合并备份中的技能和习惯并写入存储
///
/// 已有记录保持原位置，同 id 的备份记录覆盖其内容；新 id 追加在末尾。
/// 缺少时间戳的备份记录以当前时间补齐。
pub fn restore(ctx: &mut AppContext, mut doc: BackupDocument) -> CoreResult<RestoreSummary> {
    let incoming_skills = doc.skills.len();
    let incoming_habits = doc.habits.len();

    let now = ctx.clock().now();
    for skill in &mut doc.skills {
        skill.created_at.get_or_insert(now);
        skill.updated_at.get_or_insert(now);
    }
    for habit in &mut doc.habits {
        habit.created_at.get_or_insert(now);
    }

    let skills = merge_by_id(ctx.roster.skills().to_vec(), doc.skills, |s| &s.id);
    let habits = merge_by_id(ctx.roster.habits().to_vec(), doc.habits, |h| &h.id);

    let summary = RestoreSummary {
        skills: skills.len(),
        habits: habits.len(),
    };

    ctx.roster.replace_skills(skills)?;
    ctx.roster.replace_habits(habits)?;

    tracing::info!(
        incoming_skills,
        incoming_habits,
        skills = summary.skills,
        habits = summary.habits,
        "backup restored"
    );
    Ok(summary)
}

fn merge_by_id<T>(existing: Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> &str) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for item in existing.into_iter().chain(incoming) {
        let key = id(&item).to_string();
        if let Some(&pos) = positions.get(&key) {
            merged[pos] = item;
        } else {
            positions.insert(key, merged.len());
            merged.push(item);
        }
    }

    merged
}

// ============================================================
// 清空
// ============================================================

/// 删除应用拥有的全部键并重置内存状态
///
/// # Errors
/// 确认短语不是 `DELETE` 时返回 `ConfirmationMismatch`，不做任何修改。
pub fn clear_all(ctx: &mut AppContext, confirmation: &str) -> CoreResult<()> {
    if confirmation != CLEAR_CONFIRMATION {
        return Err(CoreError::ConfirmationMismatch {
            expected: CLEAR_CONFIRMATION,
        });
    }

    ctx.reset()?;
    for key in slots::ALL {
        ctx.store().raw().remove(key)?;
    }

    tracing::warn!("all local data cleared");
    Ok(())
}

// ============================================================
// 测试
// ============================================================
