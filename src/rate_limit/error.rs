use thiserror::Error;

use crate::payout::error::PayoutError;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("RateLimitError - Rate limit exceeded (max {max} per window)")]
    Exceeded { max: u32 },
    #[error("RateLimitError - PayoutError: {0}")]
    PayoutError(#[from] PayoutError),
    #[error("RateLimitError - Invalid window: {0}")]
    InvalidWindow(#[from] chrono::OutOfRangeError),
}
