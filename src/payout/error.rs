use thiserror::Error;

use super::entity::PayoutStatus;
use crate::primitives::PayoutRequestId;

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("PayoutError - Sqlx: {0}")]
    Sqlx(sqlx::Error),
    #[error("PayoutError - Address already used")]
    DuplicateAddress,
    #[error("PayoutError - Could not find payout request with id: {0}")]
    PayoutRequestNotFound(PayoutRequestId),
    #[error("PayoutError - Payout request {id} is not {expected}, cannot move to {next}")]
    InvalidTransition {
        id: PayoutRequestId,
        expected: PayoutStatus,
        next: PayoutStatus,
    },
    #[error("PayoutError - Unknown status: {0}")]
    UnknownStatus(String),
    #[error("PayoutError - Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

impl From<sqlx::Error> for PayoutError {
    fn from(error: sqlx::Error) -> Self {
        if let Some(err) = error.as_database_error() {
            if err.is_unique_violation() {
                return Self::DuplicateAddress;
            }
        }
        Self::Sqlx(error)
    }
}
