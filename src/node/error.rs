use thiserror::Error;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStep {
    CreateRawTransaction,
    FundRawTransaction,
    SignRawTransaction,
    SendRawTransaction,
}

impl RpcStep {
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateRawTransaction => "createrawtransaction",
            Self::FundRawTransaction => "fundrawtransaction",
            Self::SignRawTransaction => "signrawtransactionwithwallet",
            Self::SendRawTransaction => "sendrawtransaction",
        }
    }
}

impl fmt::Display for RpcStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("NodeError - CouldNotConnect: {0}")]
    CouldNotConnect(String),
    #[error("NodeError - RemoteCallFailure: {method}: {message}")]
    RemoteCallFailure { method: &'static str, message: String },
    #[error("NodeError - {step} failed: {message}")]
    RpcStep { step: RpcStep, message: String },
    #[error("NodeError - transaction signing incomplete")]
    SigningIncomplete,
    #[error("NodeError - Amount too low: {0} sats is below the dust limit")]
    AmountBelowDust(crate::primitives::Satoshis),
    #[error("NodeError - JoinError: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}
