//! 日志初始化
//!
//! `RUST_LOG` 优先于传入的级别；传入日志目录时按天滚动写文件。

use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger, optionally writing to a rolling daily file
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match log_dir {
        Some(dir) if std::path::Path::new(dir).is_dir() => {
            let appender = tracing_appender::rolling::daily(dir, "market-server");
            builder.with_writer(appender).init();
        }
        _ => builder.init(),
    }
}
