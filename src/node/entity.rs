use serde::{Deserialize, Serialize};

use crate::primitives::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalances {
    pub trusted: Satoshis,
    pub untrusted_pending: Satoshis,
    pub immature: Satoshis,
}

impl WalletBalances {
    /// Confirmed plus unconfirmed funds the wallet may spend from.
    pub fn available(&self) -> Satoshis {
        self.trusted + self.untrusted_pending
    }

    pub fn total(&self) -> Satoshis {
        self.trusted + self.untrusted_pending + self.immature
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub address: Option<String>,
    pub amount: Satoshis,
    pub confirmations: u32,
    pub spendable: bool,
    pub solvable: bool,
    pub safe: bool,
}

impl UnspentOutput {
    pub fn outpoint(&self) -> OutPointRef {
        OutPointRef {
            txid: self.txid.clone(),
            vout: self.vout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPointRef {
    pub txid: String,
    pub vout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxInputs {
    /// Let the node pick coins while funding the transaction.
    Auto,
    /// Spend exactly these outpoints; the funding step is skipped.
    Pinned(Vec<OutPointRef>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutputs {
    pub address: String,
    pub amount: Satoshis,
    pub memo: Option<String>,
}

impl TxOutputs {
    pub fn new(address: impl Into<String>, amount: Satoshis) -> Self {
        Self {
            address: address.into(),
            amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: Option<String>) -> Self {
        self.memo = memo.filter(|m| !m.is_empty());
        self
    }

    pub fn n_outputs(&self) -> usize {
        if self.memo.is_some() {
            2
        } else {
            1
        }
    }

    /// `createrawtransaction` output object. The memo rides along as an
    /// OP_RETURN `data` entry.
    pub fn to_rpc_value(&self) -> serde_json::Value {
        let mut outputs = serde_json::Map::new();
        outputs.insert(
            self.address.clone(),
            serde_json::Value::String(self.amount.format_btc()),
        );
        if let Some(memo) = &self.memo {
            outputs.insert(
                "data".to_string(),
                serde_json::Value::String(hex::encode(memo.as_bytes())),
            );
        }
        serde_json::Value::Object(outputs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
    Legacy,
    P2shSegwit,
    Bech32,
    Bech32m,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::P2shSegwit => "p2sh-segwit",
            Self::Bech32 => "bech32",
            Self::Bech32m => "bech32m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    pub best_block_hash: String,
    pub verification_progress: f64,
    pub pruned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_outputs_carry_hex_memo() {
        let outputs = TxOutputs::new("tb1qdest", Satoshis::from(150_000u64))
            .with_memo(Some("<3".to_string()));
        let value = outputs.to_rpc_value();
        assert_eq!(value["tb1qdest"], "0.00150000");
        assert_eq!(value["data"], "3c33");
        assert_eq!(outputs.n_outputs(), 2);
    }

    #[test]
    fn empty_memo_is_dropped() {
        let outputs =
            TxOutputs::new("tb1qdest", Satoshis::from(1_000u64)).with_memo(Some(String::new()));
        assert!(outputs.memo.is_none());
        assert_eq!(outputs.n_outputs(), 1);
    }
}
