use crate::primitives::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetEvent {
    BatchStarted {
        n_pending: usize,
        total: Satoshis,
    },
    BatchSkipped {
        reason: String,
    },
    BatchCompleted {
        sent: usize,
        failed: usize,
    },
    ConsolidationCompleted {
        tx_id: String,
        n_inputs: usize,
        output_amount: Satoshis,
    },
    ConsolidationSkipped {
        reason: String,
    },
    ConsolidationFailed {
        error: String,
    },
}

/// Receives lifecycle notifications from the batch processor and the
/// consolidator.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: FaucetEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: FaucetEvent) {
        match event {
            FaucetEvent::BatchStarted { n_pending, total } => {
                tracing::info!(n_pending, %total, "payout batch started")
            }
            FaucetEvent::BatchSkipped { reason } => {
                tracing::info!(%reason, "payout batch skipped")
            }
            FaucetEvent::BatchCompleted { sent, failed } => {
                tracing::info!(sent, failed, "payout batch completed")
            }
            FaucetEvent::ConsolidationCompleted {
                tx_id,
                n_inputs,
                output_amount,
            } => tracing::info!(%tx_id, n_inputs, %output_amount, "consolidation broadcast"),
            FaucetEvent::ConsolidationSkipped { reason } => {
                tracing::info!(%reason, "consolidation skipped")
            }
            FaucetEvent::ConsolidationFailed { error } => {
                tracing::warn!(%error, "consolidation failed")
            }
        }
    }
}
