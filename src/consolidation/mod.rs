mod config;
pub mod error;

use rust_decimal::Decimal;
use tracing::instrument;

use std::{fmt, sync::Arc};

use crate::{
    events::{EventSink, FaucetEvent},
    fees::{estimate_vbytes, FeeRate},
    node::{AddressType, NodeClient, TxInputs, TxOutputs, UnspentOutput},
    primitives::*,
};
pub use config::*;
use error::ConsolidationError;

const CONSOLIDATION_LABEL: &str = "consolidated";
const MAX_CONFIRMATIONS: u32 = 9_999_999;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoCandidates { threshold: Satoshis },
    TooFewCandidates { found: usize, min_required: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidates { threshold } => write!(
                f,
                "No UTXOs smaller than {} BTC to consolidate",
                threshold.format_btc()
            ),
            Self::TooFewCandidates {
                found,
                min_required,
            } => write!(
                f,
                "Found {found} small UTXOs, need at least {min_required} to consolidate"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsolidationResult {
    Consolidated {
        tx_id: String,
        count: usize,
        total_amount: Satoshis,
        address: String,
        estimated_vbytes: Decimal,
        estimated_fee: Satoshis,
        output_amount: Satoshis,
    },
    Skipped(SkipReason),
}

#[derive(Clone)]
pub struct Consolidator {
    node: Arc<dyn NodeClient>,
    config: ConsolidationConfig,
    fee_rate: FeeRate,
    memo: Option<String>,
    events: Arc<dyn EventSink>,
}

impl Consolidator {
    pub fn new(
        node: Arc<dyn NodeClient>,
        config: ConsolidationConfig,
        fee_rate: FeeRate,
        memo: Option<String>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            node,
            config,
            fee_rate,
            memo: memo.filter(|m| !m.is_empty()),
            events,
        }
    }

    #[instrument(name = "consolidator.consolidate", skip(self), err)]
    pub async fn consolidate(&self) -> Result<ConsolidationResult, ConsolidationError> {
        let res = self.execute().await;
        match &res {
            Ok(ConsolidationResult::Consolidated {
                tx_id,
                count,
                output_amount,
                ..
            }) => self.events.emit(FaucetEvent::ConsolidationCompleted {
                tx_id: tx_id.clone(),
                n_inputs: *count,
                output_amount: *output_amount,
            }),
            Ok(ConsolidationResult::Skipped(reason)) => {
                self.events.emit(FaucetEvent::ConsolidationSkipped {
                    reason: reason.to_string(),
                })
            }
            Err(err) => self.events.emit(FaucetEvent::ConsolidationFailed {
                error: err.to_string(),
            }),
        }
        res
    }

    async fn execute(&self) -> Result<ConsolidationResult, ConsolidationError> {
        let unspent = self.node.list_unspent(0, MAX_CONFIRMATIONS).await?;
        let threshold = self.config.threshold();
        let mut candidates = select_candidates(unspent, threshold, self.config.max_utxos);

        if candidates.is_empty() {
            return Ok(ConsolidationResult::Skipped(SkipReason::NoCandidates {
                threshold,
            }));
        }
        if candidates.len() < self.config.min_utxos {
            return Ok(ConsolidationResult::Skipped(
                SkipReason::TooFewCandidates {
                    found: candidates.len(),
                    min_required: self.config.min_utxos,
                },
            ));
        }

        let address = self
            .node
            .get_new_address(Some(CONSOLIDATION_LABEL), AddressType::Bech32)
            .await?;

        candidates.sort_by(|a, b| b.amount.cmp(&a.amount));
        let total_amount: Satoshis = candidates.iter().map(|u| u.amount).sum();
        let outputs =
            TxOutputs::new(address.clone(), Satoshis::ZERO).with_memo(self.memo.clone());
        let estimated_vbytes = estimate_vbytes(candidates.len(), outputs.n_outputs());
        let estimated_fee = self.fee_rate.fee_for_vbytes(estimated_vbytes);
        let output_amount = (total_amount - estimated_fee).round_sats();
        if !output_amount.is_positive() {
            return Err(ConsolidationError::AmountTooSmallToCoverFees {
                total: total_amount,
                fee: estimated_fee,
            });
        }

        let inputs = TxInputs::Pinned(candidates.iter().map(UnspentOutput::outpoint).collect());
        let outputs = TxOutputs {
            amount: output_amount,
            ..outputs
        };
        let tx_id = self
            .node
            .build_sign_broadcast(inputs, outputs, None)
            .await?;

        tracing::info!(
            n_inputs = candidates.len(),
            total = %total_amount.format_btc(),
            %estimated_vbytes,
            fee_rate = %self.fee_rate,
            fee = %estimated_fee,
            output = %output_amount.format_btc(),
            %address,
            %tx_id,
            "consolidated small outputs"
        );

        Ok(ConsolidationResult::Consolidated {
            tx_id,
            count: candidates.len(),
            total_amount,
            address,
            estimated_vbytes,
            estimated_fee,
            output_amount,
        })
    }
}

/// Smallest spendable outputs between dust and `threshold`, at most `max`.
fn select_candidates(
    mut unspent: Vec<UnspentOutput>,
    threshold: Satoshis,
    max: usize,
) -> Vec<UnspentOutput> {
    unspent.sort_by(|a, b| a.amount.cmp(&b.amount));
    unspent
        .into_iter()
        .filter(|u| u.spendable && u.amount <= threshold && u.amount >= DUST_LIMIT)
        .take(max)
        .collect()
}
