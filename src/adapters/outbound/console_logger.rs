use crate::domains::logger::DomainLogger;
use std::sync::Arc;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[00m";

struct ConsoleBridge {
    verbose: bool,
}

impl DomainLogger for ConsoleBridge {
    fn info(&self, msg: &str) { println!("{}", msg); }
    fn warn(&self, msg: &str) { println!("{}WARN: {}{}", YELLOW, msg, RESET); }
    fn error(&self, msg: &str) { eprintln!("{}ERROR: {}{}", RED, msg, RESET); }

    fn debug(&self, msg: &str) {
        if self.verbose {
            println!("{}{}{}", DIM, msg, RESET);
        }
    }
}

/// Console-backed session logger; the fallback when no log file is configured.
/// Debug lines are printed only for the `debug` and `trace` levels.
pub fn init_console_logger(level: &str) -> Arc<dyn DomainLogger> {
    let verbose = matches!(level.to_ascii_lowercase().as_str(), "debug" | "trace");
    Arc::new(ConsoleBridge { verbose })
}
