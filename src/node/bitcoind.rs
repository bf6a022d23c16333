use async_trait::async_trait;
use bitcoincore_rpc::{jsonrpc, Auth, Client, RpcApi};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::instrument;

use std::sync::Arc;

use super::{config::*, entity::*, error::*, r#trait::*};
use crate::{fees::FeeRate, primitives::*};

#[derive(Clone)]
pub struct BitcoindClient {
    node: Arc<Client>,
    wallet: Arc<Client>,
}

impl BitcoindClient {
    pub fn connect(config: &NodeConfig) -> Result<Self, NodeError> {
        let auth = || Auth::UserPass(config.rpc_user.clone(), config.rpc_password.clone());
        let node = Client::new(&config.endpoint, auth())
            .map_err(|e| NodeError::CouldNotConnect(e.to_string()))?;
        let wallet = Client::new(&config.wallet_endpoint(), auth())
            .map_err(|e| NodeError::CouldNotConnect(e.to_string()))?;
        Ok(Self {
            node: Arc::new(node),
            wallet: Arc::new(wallet),
        })
    }

    async fn step<T: DeserializeOwned + Send + 'static>(
        &self,
        step: RpcStep,
        args: Vec<Value>,
    ) -> Result<T, NodeError> {
        call(&self.wallet, step.method(), args)
            .await
            .map_err(|e| match e {
                NodeError::RemoteCallFailure { message, .. } => NodeError::RpcStep { step, message },
                e => e,
            })
    }
}

async fn call<T: DeserializeOwned + Send + 'static>(
    client: &Arc<Client>,
    method: &'static str,
    args: Vec<Value>,
) -> Result<T, NodeError> {
    let client = Arc::clone(client);
    tokio::task::spawn_blocking(move || client.call::<T>(method, &args))
        .await?
        .map_err(|e| NodeError::RemoteCallFailure {
            method,
            message: describe(e),
        })
}

fn describe(err: bitcoincore_rpc::Error) -> String {
    match err {
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::Error::Rpc(jsonrpc::error::RpcError {
            code,
            message,
            ..
        })) => format!("RPC error {code}: {message}"),
        e => e.to_string(),
    }
}

#[derive(Deserialize)]
struct GetBalancesResult {
    mine: MineBalances,
}

#[derive(Deserialize)]
struct MineBalances {
    trusted: f64,
    untrusted_pending: f64,
    immature: f64,
}

#[derive(Deserialize)]
struct ListUnspentEntry {
    txid: String,
    vout: u32,
    #[serde(default)]
    address: Option<String>,
    amount: f64,
    confirmations: u32,
    #[serde(default)]
    spendable: bool,
    #[serde(default)]
    solvable: bool,
    #[serde(default)]
    safe: bool,
}

impl From<ListUnspentEntry> for UnspentOutput {
    fn from(entry: ListUnspentEntry) -> Self {
        Self {
            txid: entry.txid,
            vout: entry.vout,
            address: entry.address,
            amount: Satoshis::from_btc_f64(entry.amount),
            confirmations: entry.confirmations,
            spendable: entry.spendable,
            solvable: entry.solvable,
            safe: entry.safe,
        }
    }
}

#[derive(Deserialize)]
struct FundRawTransactionResult {
    hex: String,
}

#[derive(Deserialize)]
struct SignRawTransactionResult {
    hex: String,
    complete: bool,
}

#[derive(Deserialize)]
struct GetBlockchainInfoResult {
    chain: String,
    blocks: u64,
    headers: u64,
    bestblockhash: String,
    verificationprogress: f64,
    #[serde(default)]
    pruned: bool,
}

#[async_trait]
impl NodeClient for BitcoindClient {
    #[instrument(name = "bitcoind.get_balances", skip(self), err)]
    async fn get_balances(&self) -> Result<WalletBalances, NodeError> {
        let res: GetBalancesResult = call(&self.wallet, "getbalances", vec![]).await?;
        Ok(WalletBalances {
            trusted: Satoshis::from_btc_f64(res.mine.trusted),
            untrusted_pending: Satoshis::from_btc_f64(res.mine.untrusted_pending),
            immature: Satoshis::from_btc_f64(res.mine.immature),
        })
    }

    #[instrument(name = "bitcoind.list_unspent", skip(self), fields(n_found), err)]
    async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
    ) -> Result<Vec<UnspentOutput>, NodeError> {
        let entries: Vec<ListUnspentEntry> =
            call(&self.wallet, "listunspent", vec![json!(min_conf), json!(max_conf)]).await?;
        tracing::Span::current().record("n_found", entries.len());
        Ok(entries.into_iter().map(UnspentOutput::from).collect())
    }

    #[instrument(name = "bitcoind.get_new_address", skip(self), err)]
    async fn get_new_address(
        &self,
        label: Option<&str>,
        address_type: AddressType,
    ) -> Result<String, NodeError> {
        call(
            &self.wallet,
            "getnewaddress",
            vec![json!(label.unwrap_or("")), json!(address_type.as_str())],
        )
        .await
    }

    #[instrument(
        name = "bitcoind.build_sign_broadcast",
        skip(self, inputs),
        fields(address = %outputs.address, amount = %outputs.amount, tx_id),
        err
    )]
    async fn build_sign_broadcast(
        &self,
        inputs: TxInputs,
        outputs: TxOutputs,
        fee_rate: Option<FeeRate>,
    ) -> Result<String, NodeError> {
        if outputs.amount < DUST_LIMIT {
            return Err(NodeError::AmountBelowDust(outputs.amount));
        }

        let rpc_inputs = match &inputs {
            TxInputs::Auto => json!([]),
            TxInputs::Pinned(outpoints) => Value::Array(
                outpoints
                    .iter()
                    .map(|o| json!({ "txid": o.txid, "vout": o.vout }))
                    .collect(),
            ),
        };
        let raw: String = self
            .step(
                RpcStep::CreateRawTransaction,
                vec![rpc_inputs, outputs.to_rpc_value()],
            )
            .await?;

        let unsigned = match inputs {
            TxInputs::Auto => {
                let mut args = vec![json!(raw)];
                if let Some(rate) = fee_rate {
                    args.push(json!({ "fee_rate": rate.to_rpc_string() }));
                }
                let funded: FundRawTransactionResult =
                    self.step(RpcStep::FundRawTransaction, args).await?;
                funded.hex
            }
            TxInputs::Pinned(_) => raw,
        };

        let signed: SignRawTransactionResult = self
            .step(RpcStep::SignRawTransaction, vec![json!(unsigned)])
            .await?;
        if !signed.complete {
            return Err(NodeError::SigningIncomplete);
        }

        let tx_id: String = self
            .step(RpcStep::SendRawTransaction, vec![json!(signed.hex)])
            .await?;
        tracing::Span::current().record("tx_id", tx_id.as_str());
        Ok(tx_id)
    }

    #[instrument(name = "bitcoind.list_wallets", skip(self), err)]
    async fn list_wallets(&self) -> Result<Vec<String>, NodeError> {
        call(&self.node, "listwallets", vec![]).await
    }

    #[instrument(name = "bitcoind.load_wallet", skip(self), err)]
    async fn load_wallet(&self, name: &str) -> Result<(), NodeError> {
        let _: Value = call(&self.node, "loadwallet", vec![json!(name)]).await?;
        Ok(())
    }

    #[instrument(name = "bitcoind.get_blockchain_info", skip(self), err)]
    async fn get_blockchain_info(&self) -> Result<ChainInfo, NodeError> {
        let res: GetBlockchainInfoResult = call(&self.node, "getblockchaininfo", vec![]).await?;
        Ok(ChainInfo {
            chain: res.chain,
            blocks: res.blocks,
            headers: res.headers,
            best_block_hash: res.bestblockhash,
            verification_progress: res.verificationprogress,
            pruned: res.pruned,
        })
    }
}
