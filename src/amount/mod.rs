mod config;
pub mod error;

use rand::Rng;

use crate::primitives::*;
pub use config::*;
use error::AmountError;

#[derive(Debug, Clone)]
pub struct AmountPolicy {
    config: AmountConfig,
}

impl AmountPolicy {
    pub fn new(config: AmountConfig) -> Result<Self, AmountError> {
        validate(&config)?;
        Ok(Self { config })
    }

    pub fn enabled_tiers(&self) -> impl Iterator<Item = &Tier> {
        self.config
            .tiers
            .iter()
            .filter(|t| self.config.enabled_tiers.contains(&t.id))
    }

    fn enabled(&self, id: u32) -> Option<&Tier> {
        self.enabled_tiers().find(|t| t.id == id)
    }

    /// The requested tier when enabled, otherwise the default tier.
    pub fn resolve(&self, requested: Option<u32>) -> Result<&Tier, AmountError> {
        requested
            .and_then(|id| self.enabled(id))
            .or_else(|| self.enabled(self.config.default_tier))
            .ok_or(AmountError::InvalidTier)
    }

    /// Uniform over `[min, max)` in whole satoshis.
    pub fn generate<R: Rng + ?Sized>(&self, tier: &Tier, rng: &mut R) -> Satoshis {
        let (min, max) = tier_bounds(tier);
        let span = u64::from(max - min);
        min + Satoshis::from(rng.gen_range(0..span))
    }

    pub fn amount_for<R: Rng + ?Sized>(
        &self,
        requested: Option<u32>,
        rng: &mut R,
    ) -> Result<Satoshis, AmountError> {
        let tier = self.resolve(requested)?;
        Ok(self.generate(tier, rng))
    }
}

/// Whole-sat bounds that stay inside the configured range.
fn tier_bounds(tier: &Tier) -> (Satoshis, Satoshis) {
    (
        Satoshis::from_btc(tier.min_btc).ceil_sats(),
        Satoshis::from_btc(tier.max_btc).floor_sats(),
    )
}

pub fn validate(config: &AmountConfig) -> Result<(), AmountError> {
    for tier in config.tiers.iter() {
        let (min, max) = tier_bounds(tier);
        if !min.is_positive() || min >= max {
            return Err(AmountError::InvalidRange(tier.id));
        }
    }
    for id in config.enabled_tiers.iter() {
        if !config.tiers.iter().any(|t| t.id == *id) {
            return Err(AmountError::UnknownTier(*id));
        }
    }
    if !config.enabled_tiers.contains(&config.default_tier) {
        return Err(AmountError::DefaultTierNotEnabled(config.default_tier));
    }
    Ok(())
}
