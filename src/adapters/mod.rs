pub mod connection_manager;
pub mod inbound;
pub mod outbound;

pub use connection_manager::*;
