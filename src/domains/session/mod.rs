pub mod commands;
pub mod ports;
pub mod state;

pub use commands::*;
pub use ports::*;
pub use state::*;
