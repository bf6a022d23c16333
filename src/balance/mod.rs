use tokio::sync::RwLock;
use tracing::instrument;

use std::sync::Arc;

use crate::{node::NodeClient, primitives::*};

#[derive(Clone)]
pub struct BalanceCache {
    node: Arc<dyn NodeClient>,
    available: Arc<RwLock<Satoshis>>,
}

impl BalanceCache {
    /// Reads the balance once before handing out the cache. A failed read at
    /// this point stores zero.
    #[instrument(name = "balance_cache.init", skip_all)]
    pub async fn init(node: Arc<dyn NodeClient>) -> Self {
        let initial = match node.get_balances().await {
            Ok(balances) => balances.available(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read initial wallet balance");
                Satoshis::ZERO
            }
        };
        Self {
            node,
            available: Arc::new(RwLock::new(initial)),
        }
    }

    /// Replaces the cached value only with a successful non-zero reading.
    #[instrument(name = "balance_cache.refresh", skip(self), fields(available))]
    pub async fn refresh(&self) {
        match self.node.get_balances().await {
            Ok(balances) if balances.available().is_positive() => {
                let available = balances.available();
                tracing::Span::current().record("available", tracing::field::display(available));
                *self.available.write().await = available;
            }
            Ok(_) => {
                tracing::warn!("node reported a zero balance, keeping previous value");
            }
            Err(err) => {
                tracing::warn!(error = %err, "balance refresh failed, keeping previous value");
            }
        }
    }

    pub async fn current(&self) -> Satoshis {
        *self.available.read().await
    }
}
