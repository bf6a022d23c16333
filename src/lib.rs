#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

pub mod address;
pub mod amount;
pub mod app;
pub mod balance;
pub mod cli;
pub mod consolidation;
pub mod db;
pub mod events;
pub mod fees;
pub mod job;
mod macros;
pub mod node;
pub mod payout;
pub mod primitives;
pub mod rate_limit;
mod tracing;
