//! Input Sanitization
//!
//! Guards for user-supplied numbers and text before they reach the counters.
//!
//! Functions:
//! - Practice hour validation and XP reward
//! - Energy and proficiency clamping
//! - Tag normalization

use crate::types::XP_PER_PRACTICE_HOUR;

/// Upper bound for a single energy rating
pub const MAX_ENERGY: u8 = 10;

/// Upper bound for skill proficiency
pub const MAX_PROFICIENCY: u8 = 100;

/// 练习时长是否有效（有限且非负）
pub fn is_valid_hours(hours: f64) -> bool {
    hours.is_finite() && hours >= 0.0
}

/// 练习奖励 XP：`floor(hours * 20)`，无效时长返回 None
pub fn practice_reward(hours: f64) -> Option<u64> {
    if !is_valid_hours(hours) {
        return None;
    }
    Some((hours * XP_PER_PRACTICE_HOUR).floor() as u64)
}

/// 限制精力评分范围
pub fn clamp_energy(value: u8) -> u8 {
    value.min(MAX_ENERGY)
}

/// 清理标签：去除首尾空白、丢弃空标签、去重（保留首次出现顺序）
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || out.iter().any(|t| t == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// 大小写无关的子串匹配
pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
