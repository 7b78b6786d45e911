use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

/// Install the file backend at `path` and return a logger writing to it.
/// `level` is parsed as a `log::LevelFilter` (`info` when unparseable).
pub fn init_file_logger(path: &str, level: &str) -> Result<Arc<dyn DomainLogger>, String> {
    let filter = level.parse().unwrap_or(log::LevelFilter::Info);
    FileLogger::init(path, filter).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}

