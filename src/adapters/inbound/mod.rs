pub mod data_channel;
pub mod frame_receiver;

pub use data_channel::*;
pub use frame_receiver::*;
