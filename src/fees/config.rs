use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeesConfig {
    #[serde(default = "default_fee_rate_floor_sat_per_vb")]
    pub fee_rate_floor_sat_per_vb: Decimal,
    #[serde(default = "default_payout_fee_multiplier")]
    pub payout_fee_multiplier: Decimal,
    #[serde(default = "default_admin_send_fee_multiplier")]
    pub admin_send_fee_multiplier: Decimal,
    #[serde(default = "default_consolidation_fee_rate_sat_per_vb")]
    pub consolidation_fee_rate_sat_per_vb: Decimal,
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            fee_rate_floor_sat_per_vb: default_fee_rate_floor_sat_per_vb(),
            payout_fee_multiplier: default_payout_fee_multiplier(),
            admin_send_fee_multiplier: default_admin_send_fee_multiplier(),
            consolidation_fee_rate_sat_per_vb: default_consolidation_fee_rate_sat_per_vb(),
        }
    }
}

fn default_fee_rate_floor_sat_per_vb() -> Decimal {
    dec!(0.1)
}

fn default_payout_fee_multiplier() -> Decimal {
    dec!(1.15)
}

fn default_admin_send_fee_multiplier() -> Decimal {
    dec!(1.10)
}

fn default_consolidation_fee_rate_sat_per_vb() -> Decimal {
    dec!(0.15)
}
