use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("AddressError - address cannot be empty")]
    Empty,
    #[error("AddressError - mainnet address?")]
    Mainnet,
    #[error("AddressError - invalid signet address format, must be bech32 (tb1...)")]
    InvalidFormat,
}
