mod bitcoind;
mod config;
mod entity;
pub mod error;
mod r#trait;

pub use bitcoind::*;
pub use config::*;
pub use entity::*;
pub use r#trait::*;
