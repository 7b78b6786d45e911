use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards every line to a primary logger and, optionally, a secondary one.
pub struct MultiLogger {
    primary: Arc<dyn DomainLogger>,
    secondary: Option<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(primary: Arc<dyn DomainLogger>, secondary: Option<Arc<dyn DomainLogger>>) -> Self {
        Self { primary, secondary }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.primary.info(msg);
        if let Some(sec) = &self.secondary {
            sec.info(msg);
        }
    }

    fn warn(&self, msg: &str) {
        self.primary.warn(msg);
        if let Some(sec) = &self.secondary {
            sec.warn(msg);
        }
    }

    fn error(&self, msg: &str) {
        self.primary.error(msg);
        if let Some(sec) = &self.secondary {
            sec.error(msg);
        }
    }

    fn debug(&self, msg: &str) {
        self.primary.debug(msg);
        if let Some(sec) = &self.secondary {
            sec.debug(msg);
        }
    }
}

/// Session logger for the binary: the log file plus the console when `path`
/// is given and the file backend can be installed, otherwise the console alone.
pub fn init_session_logger(path: Option<&str>, level: &str) -> Arc<dyn DomainLogger> {
    let console = crate::adapters::outbound::init_console_logger(level);
    let Some(path) = path else {
        return console;
    };
    match crate::adapters::outbound::file_logger::init_file_logger(path, level) {
        Ok(file_logger) => Arc::new(MultiLogger::new(file_logger, Some(console))) as Arc<dyn DomainLogger>,
        Err(e) => {
            console.warn(&format!("{}; logging to console only", e));
            console
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<String>>);

    impl DomainLogger for Capture {
        fn info(&self, msg: &str) { self.0.lock().unwrap().push(format!("INFO:{}", msg)); }
        fn warn(&self, msg: &str) { self.0.lock().unwrap().push(format!("WARN:{}", msg)); }
        fn error(&self, msg: &str) { self.0.lock().unwrap().push(format!("ERR:{}", msg)); }
    }

    #[test]
    fn test_forwards_to_both() {
        let a = Arc::new(Capture(Mutex::new(Vec::new())));
        let b = Arc::new(Capture(Mutex::new(Vec::new())));
        let multi = MultiLogger::new(a.clone(), Some(b.clone() as Arc<dyn DomainLogger>));

        multi.info("episode ep1");
        multi.error("boom");

        assert_eq!(*a.0.lock().unwrap(), vec!["INFO:episode ep1", "ERR:boom"]);
        assert_eq!(*b.0.lock().unwrap(), vec!["INFO:episode ep1", "ERR:boom"]);
    }
}
