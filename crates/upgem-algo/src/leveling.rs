//! 等级曲线
//!
//! 第 n 级所需 XP 为 `floor(100 * 1.5^(n-1))`，逐级严格递增。
//! 当前等级内的 XP = 累计 XP 减去 1..level-1 各级所需 XP 之和。

use crate::types::{BASE_LEVEL_XP, LEVEL_GROWTH};

/// 第 `level` 级所需 XP（level 0 视为 1 级，超出 u64 范围时饱和）
pub fn xp_for_level(level: u32) -> u64 {
    // 1.5^2000 已经溢出为 inf，截断指数避免 i32 转换回绕
    let exponent = (level.max(1) - 1).min(2_000) as i32;
    let cost = (BASE_LEVEL_XP * LEVEL_GROWTH.powi(exponent)).floor();
    // f64 -> u64 的 `as` 转换本身是饱和的
    cost as u64
}

/// 到达 `level` 之前累计需要的 XP
pub fn xp_before_level(level: u32) -> u64 {
    (1..level.max(1)).fold(0u64, |acc, i| acc.saturating_add(xp_for_level(i)))
}

/// 当前等级内已获得的 XP
///
/// 正常状态下 `total_xp >= xp_before_level(level)`；
/// 对不一致的已加载状态取 0。
pub fn current_level_xp(total_xp: u64, level: u32) -> u64 {
    total_xp.saturating_sub(xp_before_level(level))
}

/// 当前等级进度百分比，上限 100
pub fn level_progress(total_xp: u64, level: u32) -> f64 {
    let needed = xp_for_level(level) as f64;
    let progress = current_level_xp(total_xp, level) as f64 / needed * 100.0;
    progress.min(100.0)
}

/// 从累计 XP 推出对应等级（不含成就奖励）
///
/// 与引擎中的逐级循环一致：当前等级内 XP 达到本级所需即升级。
pub fn level_for_xp(total_xp: u64) -> u32 {
    let mut level = 1u32;
    while current_level_xp(total_xp, level) >= xp_for_level(level) {
        level += 1;
    }
    level
}
