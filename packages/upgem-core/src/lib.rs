//! UpGem 核心库
//!
//! 技能与习惯追踪的本地状态层：
//! - `engine`: 成长引擎（XP、等级、连续天数、成就、活动日志、学习日志、打卡）
//! - `roster`: 技能与习惯名录
//! - `context`: 把两者装配在同一个存储上的应用上下文
//! - `backup`: JSON/CSV 导出、导入与清空
//! - `storage`: 键值存储（SQLite / 内存）

pub mod backup;
pub mod clock;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod roster;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, StorageBackend};
pub use context::AppContext;
pub use engine::{DashboardSnapshot, ProgressionEngine, XpAward};
pub use error::{CoreError, CoreResult};
pub use roster::Roster;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError, TypedStore};
