//! 日志初始化
//!
//! 终端日志写到 stderr，stdout 只留给命令输出。配置了日志目录时额外写入
//! 按天滚动的文件 `upgem.log`。

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// 持有文件日志的后台写线程，drop 时刷新缓冲
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub fn init_tracing(config: &Config) -> LogGuard {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match config.log_dir.as_deref().map(rolling_writer) {
        Some(Ok((writer, guard))) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        ),
        Some(Err(err)) => {
            eprintln!("file logging disabled: {err}");
            (None, None)
        }
        None => (None, None),
    };

    // 重复初始化（例如测试中）时保留已有的 subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(file_layer)
        .try_init();

    LogGuard { _file: guard }
}

fn rolling_writer(dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, "upgem.log");
    Ok(tracing_appender::non_blocking(appender))
}
