//! # upgem-algo - 技能成长核心算法库
//!
//! 本 crate 提供与存储无关的纯 Rust 成长规则:
//!
//! - **Leveling** - 等级曲线与当前等级进度
//! - **Achievements** - 静态成就目录与单字段阈值判定
//! - **Analytics** - 学习速度、一致性、专注指数、XP 统计与打卡热力图
//!
//! ## 模块结构
//!
//! - [`leveling`] - 等级所需 XP、累计 XP、进度百分比
//! - [`achievements`] - 成就目录、解锁判定
//! - [`analytics`] - 基于日志的派生指标
//! - [`sanitize`] - 输入校验与清理
//! - [`types`] - 公共类型和常量
//!
//! ## 使用示例
//!
//! ```rust
//! use upgem_algo::leveling::{level_for_xp, xp_for_level};
//!
//! assert_eq!(xp_for_level(2), 150);
//! assert_eq!(level_for_xp(400), 3);
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod achievements;
pub mod analytics;
pub mod leveling;
pub mod sanitize;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

/// 重新导出成就目录
pub use achievements::ACHIEVEMENTS;

/// 重新导出等级曲线
pub use leveling::{current_level_xp, level_progress, xp_for_level};
