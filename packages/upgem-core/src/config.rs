use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_file: String,
    pub storage: StorageBackend,
    pub log_level: String,
    /// 文件日志目录，None 表示只写终端
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("UPGEM_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let db_file = std::env::var("UPGEM_DB_FILE").unwrap_or_else(|_| "upgem.db".to_string());

        let storage = match std::env::var("UPGEM_STORAGE")
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Ok("memory") => StorageBackend::Memory,
            _ => StorageBackend::Sqlite,
        };

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = file_logging_enabled().then(|| {
            std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("logs"))
        });

        Self {
            data_dir,
            db_file,
            storage,
            log_level,
            log_dir,
        }
    }

    /// 内存存储配置（用于测试）
    pub fn in_memory() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            db_file: "upgem.db".to_string(),
            storage: StorageBackend::Memory,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}

fn file_logging_enabled() -> bool {
    std::env::var("ENABLE_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("upgem")
}
