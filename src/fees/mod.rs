mod config;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::primitives::*;
pub use config::*;

/// Version, locktime, counts and the segwit marker rounded to a flat overhead.
pub const TX_BASE_VBYTES: Decimal = dec!(10.5);
/// Spending a P2WPKH output, witness included.
pub const P2WPKH_INPUT_VBYTES: Decimal = dec!(148);
pub const P2WPKH_OUTPUT_VBYTES: Decimal = dec!(31);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(Decimal);

impl FeeRate {
    pub fn from_sat_per_vb(sat_per_vb: Decimal) -> Self {
        Self(sat_per_vb)
    }

    pub fn as_sat_per_vb(&self) -> Decimal {
        self.0
    }

    pub fn scaled(&self, multiplier: Decimal) -> Self {
        Self(self.0 * multiplier)
    }

    pub fn fee_for_vbytes(&self, vbytes: Decimal) -> Satoshis {
        Satoshis::from(vbytes * self.0)
    }

    /// sat/vB with 8 decimals, the form `fundrawtransaction` takes in `fee_rate`.
    pub fn to_rpc_string(&self) -> String {
        format!("{:.8}", self.0)
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} sat/vB", self.0)
    }
}

pub fn estimate_vbytes(n_inputs: usize, n_outputs: usize) -> Decimal {
    TX_BASE_VBYTES
        + P2WPKH_INPUT_VBYTES * Decimal::from(n_inputs)
        + P2WPKH_OUTPUT_VBYTES * Decimal::from(n_outputs)
}

#[derive(Debug, Clone)]
pub struct FeePolicy {
    config: FeesConfig,
}

impl FeePolicy {
    pub fn new(config: FeesConfig) -> Self {
        Self { config }
    }

    fn floor(&self) -> FeeRate {
        FeeRate::from_sat_per_vb(self.config.fee_rate_floor_sat_per_vb)
    }

    pub fn payout_fee_rate(&self) -> FeeRate {
        self.floor().scaled(self.config.payout_fee_multiplier)
    }

    pub fn admin_send_fee_rate(&self) -> FeeRate {
        self.floor().scaled(self.config.admin_send_fee_multiplier)
    }

    pub fn consolidation_fee_rate(&self) -> FeeRate {
        FeeRate::from_sat_per_vb(self.config.consolidation_fee_rate_sat_per_vb)
    }
}
