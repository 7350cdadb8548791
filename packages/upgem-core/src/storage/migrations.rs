//! 数据库迁移
//!
//! 迁移按版本号顺序登记在 [`MIGRATIONS`] 中，已执行的版本记录在
//! `schema_migrations` 表里。每个迁移和它的版本记录在同一个
//! IMMEDIATE 事务中提交，失败时整体回滚。

use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use crate::storage::{StorageError, StorageResult};

/// 单个 schema 迁移
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    sql: &'static str,
}

/// 全部迁移，按版本号递增
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "键值表",
        sql: include_str!("schema.sql"),
    },
    Migration {
        version: 2,
        description: "添加更新时间索引",
        sql: "CREATE INDEX IF NOT EXISTS idx_kv_store_updated_at ON kv_store(updated_at);",
    },
];

/// 已执行的迁移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u32,
    pub description: String,
    pub applied_at: String,
}

/// 代码中最新的 schema 版本
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn ensure_version_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             version INTEGER PRIMARY KEY,
             description TEXT NOT NULL,
             applied_at TEXT NOT NULL DEFAULT (datetime('now'))
         );",
    )
    .map_err(|e| StorageError::Migration(format!("创建迁移表失败: {e}")))
}

/// 数据库当前的 schema 版本，未迁移过时为 0
pub fn schema_version(conn: &Connection) -> StorageResult<u32> {
    ensure_version_table(conn)?;
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// 执行所有版本号高于当前版本的迁移，返回执行后的版本
pub fn run_migrations(conn: &Connection) -> StorageResult<u32> {
    let current = schema_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        tracing::debug!(version = current, "schema up to date");
        return Ok(current);
    }

    let mut version = current;
    for migration in pending {
        tracing::info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );
        apply(conn, migration).map_err(|e| {
            tracing::error!(version = migration.version, error = %e, "migration failed");
            e
        })?;
        version = migration.version;
    }

    Ok(version)
}

fn apply(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    tx.execute_batch(migration.sql).map_err(|e| {
        StorageError::Migration(format!("迁移 v{} 执行失败: {e}", migration.version))
    })?;
    tx.execute(
        "INSERT INTO schema_migrations (version, description) VALUES (?1, ?2)",
        params![migration.version, migration.description],
    )?;

    // 提前返回时 tx 在 drop 中回滚
    tx.commit()?;
    Ok(())
}

/// 已执行迁移的历史，按版本号排序
pub fn applied_migrations(conn: &Connection) -> StorageResult<Vec<AppliedMigration>> {
    ensure_version_table(conn)?;

    let mut stmt = conn.prepare(
        "SELECT version, description, applied_at FROM schema_migrations ORDER BY version",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AppliedMigration {
            version: row.get(0)?,
            description: row.get(1)?,
            applied_at: row.get(2)?,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv_table_exists(conn: &Connection) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .expect("Failed to query sqlite_master")
            == 1
    }

    #[test]
    fn test_versions_strictly_increasing() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(latest_version(), 2);
    }

    #[test]
    fn test_fresh_database_reaches_latest() {
        let conn = Connection::open_in_memory().expect("Failed to open db");
        assert_eq!(schema_version(&conn).expect("Failed to read version"), 0);
        assert!(!kv_table_exists(&conn));

        assert_eq!(run_migrations(&conn).expect("Failed to migrate"), latest_version());
        assert!(kv_table_exists(&conn));
    }

    #[test]
    fn test_rerun_applies_nothing() {
        let conn = Connection::open_in_memory().expect("Failed to open db");
        run_migrations(&conn).expect("first run");
        assert_eq!(run_migrations(&conn).expect("second run"), latest_version());

        let history = applied_migrations(&conn).expect("Failed to read history");
        let versions: Vec<u32> = history.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(history[1].description, "添加更新时间索引");
    }

    #[test]
    fn test_partial_database_only_runs_pending() {
        let conn = Connection::open_in_memory().expect("Failed to open db");
        ensure_version_table(&conn).expect("Failed to create table");
        apply(&conn, &MIGRATIONS[0]).expect("Failed to apply v1");
        assert_eq!(schema_version(&conn).expect("Failed to read version"), 1);

        assert_eq!(run_migrations(&conn).expect("Failed to migrate"), 2);
        assert_eq!(applied_migrations(&conn).expect("history").len(), 2);
    }
}
