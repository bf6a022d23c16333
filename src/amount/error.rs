use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("AmountError - Invalid amount range")]
    InvalidTier,
    #[error("AmountError - Tier {0} is not configured")]
    UnknownTier(u32),
    #[error("AmountError - Default tier {0} is not in the enabled tiers")]
    DefaultTierNotEnabled(u32),
    #[error("AmountError - Tier {0} needs 0 < min < max")]
    InvalidRange(u32),
}
