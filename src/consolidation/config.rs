use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::ConsolidationError;
use crate::primitives::*;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConsolidationConfig {
    #[serde(default = "default_threshold_btc")]
    pub threshold_btc: Decimal,
    #[serde(default = "default_max_utxos")]
    pub max_utxos: usize,
    #[serde(default = "default_min_utxos")]
    pub min_utxos: usize,
}

impl ConsolidationConfig {
    pub fn threshold(&self) -> Satoshis {
        Satoshis::from_btc(self.threshold_btc)
    }

    pub fn validate(&self) -> Result<(), ConsolidationError> {
        if self.min_utxos == 0 || self.min_utxos > self.max_utxos {
            return Err(ConsolidationError::InvalidConfig(format!(
                "min_utxos ({}) must be between 1 and max_utxos ({})",
                self.min_utxos, self.max_utxos
            )));
        }
        if self.threshold() < DUST_LIMIT {
            return Err(ConsolidationError::InvalidConfig(format!(
                "threshold_btc ({}) is below the dust limit",
                self.threshold_btc
            )));
        }
        Ok(())
    }
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            threshold_btc: default_threshold_btc(),
            max_utxos: default_max_utxos(),
            min_utxos: default_min_utxos(),
        }
    }
}

fn default_threshold_btc() -> Decimal {
    dec!(0.001)
}

fn default_max_utxos() -> usize {
    5
}

fn default_min_utxos() -> usize {
    2
}
