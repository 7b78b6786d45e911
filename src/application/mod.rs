pub mod logging_consumer;
pub mod session_driver;

pub use logging_consumer::*;
pub use session_driver::*;
