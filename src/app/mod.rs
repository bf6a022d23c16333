mod config;
pub mod error;

use sqlx::{Pool, Sqlite};
use tracing::instrument;

use std::sync::Arc;

use crate::{
    address,
    amount::AmountPolicy,
    balance::BalanceCache,
    consolidation::{ConsolidationResult, Consolidator},
    events::EventSink,
    fees::FeePolicy,
    job::{BatchOutcome, Jobs, PayoutBatchProcessor},
    node::{AddressType, ChainInfo, NodeClient, TxInputs, TxOutputs, UnspentOutput, WalletBalances},
    payout::*,
    primitives::*,
    rate_limit::RateLimiter,
};
pub use config::*;
use error::ApplicationError;

const RECENT_REQUESTS_LIMIT: u32 = 50;
const STUCK_PROCESSING_MESSAGE: &str =
    "interrupted while processing: broadcast state unknown, check the wallet before resubmitting";

#[derive(Debug, Clone)]
pub struct FaucetStats {
    pub pending: i64,
    pub processing: i64,
    pub broadcast: i64,
    pub failed: i64,
    pub total_sent: Satoshis,
    pub recent: Vec<PayoutRequest>,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub chain: Option<ChainInfo>,
    pub node_error: Option<String>,
    pub store_error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.node_error.is_none() && self.store_error.is_none()
    }
}

pub struct App {
    config: AppConfig,
    node: Arc<dyn NodeClient>,
    payout_requests: PayoutRequests,
    amount_policy: AmountPolicy,
    rate_limiter: RateLimiter,
    fee_policy: FeePolicy,
    balance_cache: BalanceCache,
    consolidator: Consolidator,
    batch_processor: PayoutBatchProcessor,
}

impl App {
    /// Validates the config, makes sure the wallet is loaded and takes the
    /// first balance reading.
    pub async fn init(
        pool: Pool<Sqlite>,
        node: Arc<dyn NodeClient>,
        wallet_name: &str,
        config: AppConfig,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, ApplicationError> {
        config.validate()?;
        ensure_wallet_loaded(node.as_ref(), wallet_name).await?;

        let payout_requests = PayoutRequests::new(&pool);
        let fee_policy = FeePolicy::new(config.fees.clone());
        let amount_policy = AmountPolicy::new(config.amount.clone())?;
        let rate_limiter = RateLimiter::new(&payout_requests, config.rate_limit.clone());
        let balance_cache = BalanceCache::init(Arc::clone(&node)).await;
        let consolidator = Consolidator::new(
            Arc::clone(&node),
            config.consolidation.clone(),
            fee_policy.consolidation_fee_rate(),
            config.memo.clone(),
            Arc::clone(&events),
        );
        let batch_processor = PayoutBatchProcessor::new(
            &payout_requests,
            Arc::clone(&node),
            events,
            fee_policy.payout_fee_rate(),
            config.memo.clone(),
            config.jobs.batch_page_size,
        );

        tracing::info!(
            wallet = wallet_name,
            enabled_tiers = ?config.amount.enabled_tiers,
            default_tier = config.amount.default_tier,
            "faucet initialized"
        );

        Ok(Self {
            config,
            node,
            payout_requests,
            amount_policy,
            rate_limiter,
            fee_policy,
            balance_cache,
            consolidator,
            batch_processor,
        })
    }

    /// Settles records left in `processing` by an earlier run, then spawns the
    /// periodic jobs. Nothing else moves records to `processing`, so every
    /// such record at this point belongs to a previous process.
    pub async fn start_jobs(&self) -> Result<Jobs, ApplicationError> {
        self.fail_stuck_processing().await?;
        let consolidator = self
            .config
            .jobs
            .auto_consolidation_interval
            .map(|_| self.consolidator.clone());
        Ok(Jobs::start(
            &self.config.jobs,
            self.batch_processor.clone(),
            self.balance_cache.clone(),
            consolidator,
        ))
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        self.config.jobs.shutdown_timeout
    }

    #[instrument(name = "app.fail_stuck_processing", skip(self), fields(n_failed), err)]
    pub async fn fail_stuck_processing(&self) -> Result<u64, ApplicationError> {
        let n_failed = self
            .payout_requests
            .fail_stuck_processing(STUCK_PROCESSING_MESSAGE)
            .await?;
        tracing::Span::current().record("n_failed", n_failed);
        if n_failed > 0 {
            tracing::warn!(n_failed, "marked stuck processing payouts as failed");
        }
        Ok(n_failed)
    }

    #[instrument(name = "app.submit", skip(self), fields(id, amount), err)]
    pub async fn submit(
        &self,
        address: &str,
        source: &str,
        tier: Option<u32>,
    ) -> Result<PayoutRequest, ApplicationError> {
        let address = address::validate_signet_address(address)?;
        self.rate_limiter.check(source).await?;
        let amount = self
            .amount_policy
            .amount_for(tier, &mut rand::thread_rng())?;
        let new_request = NewPayoutRequest::builder()
            .address(address)
            .source(source)
            .amount(amount)
            .build()
            .expect("Couldn't build NewPayoutRequest");
        let request = self.payout_requests.create(new_request).await?;
        let span = tracing::Span::current();
        span.record("id", tracing::field::display(request.id));
        span.record("amount", tracing::field::display(amount));
        tracing::info!(address = %request.address, %source, "address queued");
        Ok(request)
    }

    pub async fn find_payout_request(
        &self,
        id: PayoutRequestId,
    ) -> Result<PayoutRequest, ApplicationError> {
        Ok(self.payout_requests.find_by_id(id).await?)
    }

    pub async fn process_batch(&self) -> Result<BatchOutcome, ApplicationError> {
        Ok(self.batch_processor.process_batch().await?)
    }

    pub async fn consolidate(&self) -> Result<ConsolidationResult, ApplicationError> {
        Ok(self.consolidator.consolidate().await?)
    }

    pub async fn current_cached_balance(&self) -> Satoshis {
        self.balance_cache.current().await
    }

    pub async fn refresh_cached_balance(&self) {
        self.balance_cache.refresh().await
    }

    /// Live read from the node, bypassing the cache.
    pub async fn available_balance(&self) -> Result<Satoshis, ApplicationError> {
        Ok(self.node.get_balances().await?.available())
    }

    pub async fn wallet_balances(&self) -> Result<WalletBalances, ApplicationError> {
        Ok(self.node.get_balances().await?)
    }

    pub async fn list_unspent(&self) -> Result<Vec<UnspentOutput>, ApplicationError> {
        let mut unspent = self.node.list_unspent(0, 9_999_999).await?;
        unspent.sort_by(|a, b| {
            a.confirmations
                .cmp(&b.confirmations)
                .then_with(|| a.vout.cmp(&b.vout))
        });
        Ok(unspent)
    }

    pub async fn new_deposit_address(&self) -> Result<String, ApplicationError> {
        Ok(self
            .node
            .get_new_address(None, AddressType::Bech32)
            .await?)
    }

    #[instrument(name = "app.send_funds", skip(self, memo), err)]
    pub async fn send_funds(
        &self,
        address: &str,
        amount: Satoshis,
        memo: Option<String>,
    ) -> Result<String, ApplicationError> {
        let address = address::validate_signet_address(address)?;
        if !amount.is_positive() {
            return Err(ApplicationError::InvalidAmount(
                "amount must be greater than 0".to_string(),
            ));
        }
        let available = self.available_balance().await?;
        if amount > available {
            return Err(ApplicationError::InsufficientFunds {
                available,
                requested: amount,
            });
        }
        let outputs = TxOutputs::new(address, amount).with_memo(memo);
        let tx_id = self
            .node
            .build_sign_broadcast(
                TxInputs::Auto,
                outputs,
                Some(self.fee_policy.admin_send_fee_rate()),
            )
            .await?;
        tracing::info!(%address, amount = %amount.format_btc(), %tx_id, "operator send broadcast");
        Ok(tx_id)
    }

    pub async fn stats(&self) -> Result<FaucetStats, ApplicationError> {
        Ok(FaucetStats {
            pending: self
                .payout_requests
                .count_by_status(PayoutStatus::Pending)
                .await?,
            processing: self
                .payout_requests
                .count_by_status(PayoutStatus::Processing)
                .await?,
            broadcast: self
                .payout_requests
                .count_by_status(PayoutStatus::Broadcast)
                .await?,
            failed: self
                .payout_requests
                .count_by_status(PayoutStatus::Failed)
                .await?,
            total_sent: self.payout_requests.total_broadcast_amount().await?,
            recent: self
                .payout_requests
                .list_recent(RECENT_REQUESTS_LIMIT)
                .await?,
        })
    }

    pub async fn health(&self) -> HealthReport {
        let (chain, node_error) = match self.node.get_blockchain_info().await {
            Ok(info) => (Some(info), None),
            Err(err) => (None, Some(err.to_string())),
        };
        let store_error = self.payout_requests.ping().await.err().map(|e| e.to_string());
        HealthReport {
            chain,
            node_error,
            store_error,
        }
    }
}

#[instrument(name = "app.ensure_wallet_loaded", skip(node), err)]
async fn ensure_wallet_loaded(
    node: &dyn NodeClient,
    wallet_name: &str,
) -> Result<(), ApplicationError> {
    let wallets = node.list_wallets().await?;
    if wallets.iter().any(|w| w == wallet_name) {
        return Ok(());
    }
    tracing::info!(wallet = wallet_name, "wallet not loaded, attempting to load it");
    node.load_wallet(wallet_name)
        .await
        .map_err(|e| ApplicationError::WalletUnavailable {
            wallet: wallet_name.to_string(),
            message: e.to_string(),
        })?;
    tracing::info!(wallet = wallet_name, "wallet loaded");
    Ok(())
}
