//! Joystick client for a robot simulator.
//!
//! Two TCP channels connect the joystick to the simulator: an outbound
//! command channel (one connection per message) and an inbound data channel
//! (the joystick listens, the simulator connects once per message). Frames on
//! both are delimited by connection closure. Over the data channel the
//! simulator sends an episode catalog followed by one metadata document per
//! episode, which is decoded into an [`Episode`] and acknowledged with
//! `"ready"`.

pub mod adapters;
pub mod application;
pub mod common;
pub mod config;
pub mod domains;

pub use config::Config;

// Re-export common types
pub use common::*;

// Re-export domain modules
pub use domains::*;

pub use adapters::ConnectionManager;
pub use application::{LoggingConsumer, SessionDriver, SessionReport};
