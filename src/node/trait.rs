use async_trait::async_trait;

use super::{entity::*, error::*};
use crate::fees::FeeRate;

#[async_trait]
pub trait NodeClient: Send + Sync + 'static {
    async fn get_balances(&self) -> Result<WalletBalances, NodeError>;

    async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
    ) -> Result<Vec<UnspentOutput>, NodeError>;

    async fn get_new_address(
        &self,
        label: Option<&str>,
        address_type: AddressType,
    ) -> Result<String, NodeError>;

    /// create-raw → fund (auto inputs only) → sign → broadcast.
    /// Returns the id of the broadcast transaction.
    async fn build_sign_broadcast(
        &self,
        inputs: TxInputs,
        outputs: TxOutputs,
        fee_rate: Option<FeeRate>,
    ) -> Result<String, NodeError>;

    async fn list_wallets(&self) -> Result<Vec<String>, NodeError>;

    async fn load_wallet(&self, name: &str) -> Result<(), NodeError>;

    async fn get_blockchain_info(&self) -> Result<ChainInfo, NodeError>;
}
