use thiserror::Error;

use crate::{
    address::error::AddressError,
    amount::error::AmountError,
    consolidation::error::ConsolidationError,
    job::error::JobError,
    node::error::NodeError,
    payout::error::PayoutError,
    primitives::{InternalError, Satoshis},
    rate_limit::error::RateLimitError,
};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("FaucetError - InvalidAddress: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("FaucetError - Rate limit exceeded (max {max} per 24h)")]
    RateLimited { max: u32 },
    #[error("FaucetError - Address already used")]
    DuplicateAddress,
    #[error("FaucetError - Invalid amount range")]
    InvalidTier,
    #[error("FaucetError - InvalidAmount: {0}")]
    InvalidAmount(String),
    #[error("FaucetError - Insufficient funds: {available} sats available, {requested} sats requested")]
    InsufficientFunds {
        available: Satoshis,
        requested: Satoshis,
    },
    #[error("FaucetError - InvalidConfig: {0}")]
    InvalidConfig(String),
    #[error("FaucetError - '{wallet}' wallet not found or failed to load - please create it with: bitcoin-cli -signet createwallet {wallet} (error: {message})")]
    WalletUnavailable { wallet: String, message: String },
    #[error("FaucetError - PayoutError: {0}")]
    PayoutError(PayoutError),
    #[error("FaucetError - NodeError: {0}")]
    NodeError(#[from] NodeError),
    #[error("FaucetError - ConsolidationError: {0}")]
    ConsolidationError(#[from] ConsolidationError),
    #[error("FaucetError - JobError: {0}")]
    JobError(#[from] JobError),
    #[error("FaucetError - Internal: {0}")]
    Internal(#[from] InternalError),
}

impl From<PayoutError> for ApplicationError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::DuplicateAddress => Self::DuplicateAddress,
            err => Self::PayoutError(err),
        }
    }
}

impl From<RateLimitError> for ApplicationError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::Exceeded { max } => Self::RateLimited { max },
            RateLimitError::PayoutError(err) => Self::from(err),
            RateLimitError::InvalidWindow(err) => Self::InvalidConfig(err.to_string()),
        }
    }
}

impl From<AmountError> for ApplicationError {
    fn from(err: AmountError) -> Self {
        match err {
            AmountError::InvalidTier => Self::InvalidTier,
            err => Self::InvalidConfig(err.to_string()),
        }
    }
}
