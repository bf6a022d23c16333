#![allow(dead_code)]

use async_trait::async_trait;
use rand::{seq::SliceRandom, Rng};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use std::{collections::HashSet, sync::Arc, sync::Mutex};

use faucet::{
    events::{EventSink, FaucetEvent},
    fees::FeeRate,
    node::{error::*, *},
    primitives::*,
};

pub async fn init_pool() -> anyhow::Result<Pool<Sqlite>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    faucet::db::migrate(&pool).await?;
    Ok(pool)
}

const BECH32_CHARS: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

pub fn random_signet_address() -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..39)
        .map(|_| *BECH32_CHARS.choose(&mut rng).expect("non-empty charset") as char)
        .collect();
    format!("tb1q{body}")
}

pub fn random_source() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "10.{}.{}.{}",
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen::<u8>()
    )
}

pub fn utxo(vout: u32, sats: u64) -> UnspentOutput {
    UnspentOutput {
        txid: format!("{:064x}", 0xfau64 + u64::from(vout)),
        vout,
        address: Some(random_signet_address()),
        amount: Satoshis::from(sats),
        confirmations: 6,
        spendable: true,
        solvable: true,
        safe: true,
    }
}

#[derive(Debug, Clone)]
pub struct Broadcast {
    pub inputs: TxInputs,
    pub outputs: TxOutputs,
    pub fee_rate: Option<FeeRate>,
    pub tx_id: String,
}

#[derive(Debug, Default)]
pub struct MockState {
    /// `None` makes `get_balances` fail.
    pub balances: Option<WalletBalances>,
    pub unspent: Vec<UnspentOutput>,
    pub wallets: Vec<String>,
    pub load_wallet_fails: bool,
    pub loaded_wallets: Vec<String>,
    pub rejected_addresses: HashSet<String>,
    pub broadcasts: Vec<Broadcast>,
    pub address_requests: Vec<(Option<String>, AddressType)>,
    pub chain_unreachable: bool,
    pub balance_reads: usize,
}

#[derive(Debug, Default)]
pub struct MockNode {
    state: Mutex<MockState>,
}

impl MockNode {
    pub fn funded(sats: u64) -> Arc<Self> {
        let node = Self::default();
        {
            let mut state = node.state();
            state.wallets = vec!["faucet".to_string()];
            state.balances = Some(WalletBalances {
                trusted: Satoshis::from(sats),
                ..Default::default()
            });
        }
        Arc::new(node)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    pub fn set_available(&self, sats: u64) {
        self.state().balances = Some(WalletBalances {
            trusted: Satoshis::from(sats),
            ..Default::default()
        });
    }

    pub fn fail_balances(&self) {
        self.state().balances = None;
    }

    pub fn reject_address(&self, address: &str) {
        self.state().rejected_addresses.insert(address.to_string());
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.state().broadcasts.clone()
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn get_balances(&self) -> Result<WalletBalances, NodeError> {
        let mut state = self.state();
        state.balance_reads += 1;
        state.balances.ok_or_else(|| NodeError::RemoteCallFailure {
            method: "getbalances",
            message: "RPC error -18: Requested wallet does not exist or is not loaded".to_string(),
        })
    }

    async fn list_unspent(
        &self,
        _min_conf: u32,
        _max_conf: u32,
    ) -> Result<Vec<UnspentOutput>, NodeError> {
        Ok(self.state().unspent.clone())
    }

    async fn get_new_address(
        &self,
        label: Option<&str>,
        address_type: AddressType,
    ) -> Result<String, NodeError> {
        self.state()
            .address_requests
            .push((label.map(str::to_string), address_type));
        Ok(random_signet_address())
    }

    async fn build_sign_broadcast(
        &self,
        inputs: TxInputs,
        outputs: TxOutputs,
        fee_rate: Option<FeeRate>,
    ) -> Result<String, NodeError> {
        if outputs.amount < DUST_LIMIT {
            return Err(NodeError::AmountBelowDust(outputs.amount));
        }
        let mut state = self.state();
        if state.rejected_addresses.contains(&outputs.address) {
            return Err(NodeError::RpcStep {
                step: RpcStep::FundRawTransaction,
                message: "RPC error -4: Insufficient funds".to_string(),
            });
        }
        let tx_id = format!("{:064x}", state.broadcasts.len() + 1);
        state.broadcasts.push(Broadcast {
            inputs,
            outputs,
            fee_rate,
            tx_id: tx_id.clone(),
        });
        Ok(tx_id)
    }

    async fn list_wallets(&self) -> Result<Vec<String>, NodeError> {
        Ok(self.state().wallets.clone())
    }

    async fn load_wallet(&self, name: &str) -> Result<(), NodeError> {
        let mut state = self.state();
        if state.load_wallet_fails {
            return Err(NodeError::RemoteCallFailure {
                method: "loadwallet",
                message: "RPC error -18: Wallet file not found".to_string(),
            });
        }
        state.loaded_wallets.push(name.to_string());
        state.wallets.push(name.to_string());
        Ok(())
    }

    async fn get_blockchain_info(&self) -> Result<ChainInfo, NodeError> {
        if self.state().chain_unreachable {
            return Err(NodeError::RemoteCallFailure {
                method: "getblockchaininfo",
                message: "connection refused".to_string(),
            });
        }
        Ok(ChainInfo {
            chain: "signet".to_string(),
            blocks: 200_000,
            headers: 200_000,
            best_block_hash: "00".repeat(32),
            verification_progress: 1.0,
            pruned: false,
        })
    }
}

#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<FaucetEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<FaucetEvent> {
        self.events.lock().expect("events poisoned").clone()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: FaucetEvent) {
        self.events.lock().expect("events poisoned").push(event);
    }
}
