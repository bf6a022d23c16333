use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use std::{fmt, str::FromStr};

use super::error::PayoutError;
use crate::primitives::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Broadcast,
    Failed,
}

impl PayoutStatus {
    pub const ALL: [PayoutStatus; 4] = [
        PayoutStatus::Pending,
        PayoutStatus::Processing,
        PayoutStatus::Broadcast,
        PayoutStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Broadcast => "broadcast",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: PayoutStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Broadcast)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutStatus {
    type Err = PayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "broadcast" => Ok(Self::Broadcast),
            "failed" => Ok(Self::Failed),
            other => Err(PayoutError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutRequest {
    pub id: PayoutRequestId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub address: String,
    pub source: String,
    pub external_tx_id: Option<String>,
    pub amount: Satoshis,
    pub status: PayoutStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Builder, Clone)]
pub struct NewPayoutRequest {
    #[builder(setter(into))]
    pub(super) id: PayoutRequestId,
    #[builder(setter(into))]
    pub(super) address: String,
    #[builder(setter(into))]
    pub(super) source: String,
    #[builder(setter(into))]
    pub(super) amount: Satoshis,
    #[builder(default = "Utc::now()")]
    pub(super) created_at: DateTime<Utc>,
}

impl NewPayoutRequest {
    pub fn builder() -> NewPayoutRequestBuilder {
        let mut builder = NewPayoutRequestBuilder::default();
        builder.id(PayoutRequestId::new());
        builder
    }
}
