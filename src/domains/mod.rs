pub mod episode;
pub mod logger;
pub mod session;

pub use episode::*;
pub use logger::*;
pub use session::*;
