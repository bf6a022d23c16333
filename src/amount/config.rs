use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: u32,
    pub min_btc: Decimal,
    pub max_btc: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountConfig {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<Tier>,
    #[serde(default = "default_enabled_tiers")]
    pub enabled_tiers: Vec<u32>,
    #[serde(default = "default_tier")]
    pub default_tier: u32,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            enabled_tiers: default_enabled_tiers(),
            default_tier: default_tier(),
        }
    }
}

fn default_tiers() -> Vec<Tier> {
    vec![
        Tier {
            id: 1,
            min_btc: dec!(0.001),
            max_btc: dec!(0.009),
        },
        Tier {
            id: 2,
            min_btc: dec!(0.01),
            max_btc: dec!(0.09),
        },
        Tier {
            id: 3,
            min_btc: dec!(0.1),
            max_btc: dec!(0.9),
        },
        Tier {
            id: 4,
            min_btc: dec!(1.0),
            max_btc: dec!(2.0),
        },
    ]
}

fn default_enabled_tiers() -> Vec<u32> {
    vec![1, 2, 3]
}

fn default_tier() -> u32 {
    2
}
