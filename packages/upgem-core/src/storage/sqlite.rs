//! SQLite 键值存储
//!
//! 单个数据库文件中的 `kv_store` 表，打开时自动启用 WAL 并运行迁移。

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::{migrations, KeyValueStore, StorageError, StorageResult};

/// 基于 SQLite 的键值存储
pub struct SqliteStore {
    connection: Mutex<Connection>,
    db_path: String,
}

impl SqliteStore {
    /// 打开（或创建）数据库文件
    ///
    /// 自动启用 WAL 模式，并运行数据库迁移。
    ///
    /// # Arguments
    /// * `db_path` - 数据库文件路径
    ///
    /// # Example
    /// ```ignore
    /// let store = SqliteStore::open("./data/upgem.db")?;
    /// ```
    pub fn open<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        let connection = Connection::open(&db_path)?;

        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;

        let store = Self {
            connection: Mutex::new(connection),
            db_path: path_str,
        };
        store.initialize()?;

        tracing::info!(path = %store.db_path, "sqlite store opened");
        Ok(store)
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;

        let store = Self {
            connection: Mutex::new(connection),
            db_path: ":memory:".to_string(),
        };
        store.initialize()?;

        Ok(store)
    }

    /// 运行迁移
    fn initialize(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        migrations::run_migrations(&conn)?;
        Ok(())
    }

    /// 获取数据库连接的锁
    pub fn get_connection(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| StorageError::LockError(e.to_string()))
    }

    /// 获取数据库路径
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 键的最后更新时间（SQLite `datetime('now')` 格式）
    pub fn updated_at(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.get_connection()?;
        let value = conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.get_connection()?;

        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let conn = self.get_connection()?;

        let affected = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;

        Ok(affected > 0)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let conn = self.get_connection()?;

        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys)
    }
}

// ============================================================
// 测试
// ============================================================
