mod entity;
pub mod error;
mod repo;

pub use entity::*;
pub use repo::*;
