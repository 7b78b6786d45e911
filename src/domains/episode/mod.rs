pub mod agent;
pub mod catalog;
pub mod decoder;
pub mod environment;
pub mod episode;
pub mod geometry;
pub mod schema;

pub use agent::*;
pub use catalog::*;
pub use decoder::*;
pub use environment::*;
pub use episode::*;
pub use geometry::*;
