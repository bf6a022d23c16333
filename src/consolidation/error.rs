use thiserror::Error;

use crate::{node::error::NodeError, primitives::Satoshis};

#[derive(Error, Debug)]
pub enum ConsolidationError {
    #[error("ConsolidationError - NodeError: {0}")]
    NodeError(#[from] NodeError),
    #[error("ConsolidationError - total amount {total} sats too small to cover fee of {fee} sats")]
    AmountTooSmallToCoverFees { total: Satoshis, fee: Satoshis },
    #[error("ConsolidationError - InvalidConfig: {0}")]
    InvalidConfig(String),
}
