use thiserror::Error;

use std::time::Duration;

use crate::{
    consolidation::error::ConsolidationError, node::error::NodeError, payout::error::PayoutError,
};

#[derive(Error, Debug)]
pub enum JobError {
    #[error("{0}")]
    PayoutError(#[from] PayoutError),
    #[error("{0}")]
    NodeError(#[from] NodeError),
    #[error("{0}")]
    ConsolidationError(#[from] ConsolidationError),
    #[error("JobError - ShutdownTimeout: jobs still running after {0:?}")]
    ShutdownTimeout(Duration),
}
