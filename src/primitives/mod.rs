mod error;

pub use error::*;

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use std::fmt;

crate::entity_id! { PayoutRequestId }

pub const SATS_PER_BTC: Decimal = dec!(100_000_000);

/// Outputs below this are never created nor consolidated.
pub const DUST_LIMIT: Satoshis = Satoshis(dec!(1000));

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Satoshis(Decimal);

impl Satoshis {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn to_btc(self) -> Decimal {
        self.0 / SATS_PER_BTC
    }

    pub fn from_btc(btc: Decimal) -> Self {
        Self(btc * SATS_PER_BTC)
    }

    /// Amounts reported by bitcoind arrive as JSON floats with 8 decimals.
    pub fn from_btc_f64(btc: f64) -> Self {
        let btc = Decimal::from_f64_retain(btc)
            .unwrap_or_default()
            .round_dp(8);
        Self::from_btc(btc)
    }

    /// Drops any fractional satoshi, never rounding up.
    pub fn floor_sats(self) -> Self {
        Self(self.0.round_dp_with_strategy(0, RoundingStrategy::ToZero))
    }

    /// Rounds any fractional satoshi up to the next whole one.
    pub fn ceil_sats(self) -> Self {
        Self(self.0.round_dp_with_strategy(0, RoundingStrategy::AwayFromZero))
    }

    /// Nearest whole satoshi, i.e. what an eight-decimal BTC string carries.
    pub fn round_sats(self) -> Self {
        Self(self.0.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Eight-decimal BTC string as expected by the node RPC.
    pub fn format_btc(&self) -> String {
        format!("{:.8}", self.to_btc())
    }
}

impl fmt::Display for Satoshis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Satoshis {
    fn from(sats: Decimal) -> Self {
        Self(sats)
    }
}

impl From<u64> for Satoshis {
    fn from(sats: u64) -> Self {
        Self(Decimal::from(sats))
    }
}

impl From<u32> for Satoshis {
    fn from(sats: u32) -> Self {
        Self(Decimal::from(sats))
    }
}

impl From<i64> for Satoshis {
    fn from(sats: i64) -> Self {
        Self(Decimal::from(sats))
    }
}

impl From<Satoshis> for u64 {
    fn from(sats: Satoshis) -> u64 {
        sats.0.to_u64().expect("Couldn't convert Satoshis")
    }
}

impl From<Satoshis> for i64 {
    fn from(sats: Satoshis) -> i64 {
        sats.0.to_i64().expect("Couldn't convert Satoshis")
    }
}

impl std::ops::Add<Satoshis> for Satoshis {
    type Output = Satoshis;
    fn add(self, rhs: Satoshis) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub<Satoshis> for Satoshis {
    type Output = Satoshis;
    fn sub(self, rhs: Satoshis) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign<Satoshis> for Satoshis {
    fn add_assign(&mut self, rhs: Satoshis) {
        *self = Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Satoshis {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Satoshis::ZERO, |a, b| a + b)
    }
}

impl<'a> std::iter::Sum<&'a Satoshis> for Satoshis {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Satoshis::ZERO, |a, b| a + *b)
    }
}
