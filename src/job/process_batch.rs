use tracing::instrument;

use std::sync::Arc;

use super::error::JobError;
use crate::{
    events::{EventSink, FaucetEvent},
    fees::FeeRate,
    node::{NodeClient, TxInputs, TxOutputs},
    payout::*,
    primitives::*,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Empty,
    BalanceUnavailable,
    InsufficientBalance {
        available: Satoshis,
        required: Satoshis,
    },
    Processed {
        sent: usize,
        failed: usize,
    },
}

#[derive(Clone)]
pub struct PayoutBatchProcessor {
    payout_requests: PayoutRequests,
    node: Arc<dyn NodeClient>,
    events: Arc<dyn EventSink>,
    fee_rate: FeeRate,
    memo: Option<String>,
    page_size: u32,
}

impl PayoutBatchProcessor {
    pub fn new(
        payout_requests: &PayoutRequests,
        node: Arc<dyn NodeClient>,
        events: Arc<dyn EventSink>,
        fee_rate: FeeRate,
        memo: Option<String>,
        page_size: u32,
    ) -> Self {
        Self {
            payout_requests: payout_requests.clone(),
            node,
            events,
            fee_rate,
            memo,
            page_size,
        }
    }

    /// One pass over the pending queue. The page is admitted as a whole or not
    /// at all; once admitted each record is settled on its own.
    #[instrument(
        name = "job.process_batch",
        skip(self),
        fields(n_pending, total_required, available, sent, failed),
        err
    )]
    pub async fn process_batch(&self) -> Result<BatchOutcome, JobError> {
        let pending = self
            .payout_requests
            .list_by_status(PayoutStatus::Pending, self.page_size)
            .await?;
        if pending.is_empty() {
            return Ok(BatchOutcome::Empty);
        }

        let required: Satoshis = pending.iter().map(|r| r.amount).sum();
        let span = tracing::Span::current();
        span.record("n_pending", pending.len());
        span.record("total_required", tracing::field::display(required));
        self.events.emit(FaucetEvent::BatchStarted {
            n_pending: pending.len(),
            total: required,
        });

        let available = match self.node.get_balances().await {
            Ok(balances) => balances.available(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read live balance, skipping batch");
                self.events.emit(FaucetEvent::BatchSkipped {
                    reason: err.to_string(),
                });
                return Ok(BatchOutcome::BalanceUnavailable);
            }
        };
        span.record("available", tracing::field::display(available));
        if available < required {
            tracing::warn!(
                available = %available.format_btc(),
                required = %required.format_btc(),
                n_pending = pending.len(),
                "insufficient balance for batch"
            );
            self.events.emit(FaucetEvent::BatchSkipped {
                reason: format!(
                    "Insufficient balance: {} BTC available - need {} BTC",
                    available.format_btc(),
                    required.format_btc()
                ),
            });
            return Ok(BatchOutcome::InsufficientBalance {
                available,
                required,
            });
        }

        let mut sent = 0;
        let mut failed = 0;
        for request in pending {
            if let Err(err) = self.payout_requests.mark_processing(request.id).await {
                tracing::error!(id = %request.id, error = %err, "could not mark payout processing");
                continue;
            }
            let outputs =
                TxOutputs::new(request.address.as_str(), request.amount).with_memo(self.memo.clone());
            match self
                .node
                .build_sign_broadcast(TxInputs::Auto, outputs, Some(self.fee_rate))
                .await
            {
                Ok(tx_id) => {
                    tracing::info!(
                        id = %request.id,
                        address = %request.address,
                        amount = %request.amount.format_btc(),
                        %tx_id,
                        "payout broadcast"
                    );
                    if let Err(err) = self.payout_requests.mark_broadcast(request.id, &tx_id).await
                    {
                        tracing::error!(id = %request.id, %tx_id, error = %err, "could not mark payout broadcast");
                    }
                    sent += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(id = %request.id, address = %request.address, error = %message, "payout failed");
                    if let Err(err) = self.payout_requests.mark_failed(request.id, &message).await {
                        tracing::error!(id = %request.id, error = %err, "could not mark payout failed");
                    }
                    failed += 1;
                }
            }
        }

        span.record("sent", sent);
        span.record("failed", failed);
        tracing::info!(sent, failed, "batch complete");
        self.events.emit(FaucetEvent::BatchCompleted { sent, failed });
        Ok(BatchOutcome::Processed { sent, failed })
    }
}
