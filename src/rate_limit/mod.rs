mod config;
pub mod error;

use chrono::Utc;
use tracing::instrument;

use crate::payout::PayoutRequests;
pub use config::*;
use error::RateLimitError;

/// Sliding-window admission check backed by the persisted requests.
#[derive(Clone)]
pub struct RateLimiter {
    payout_requests: PayoutRequests,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(payout_requests: &PayoutRequests, config: RateLimitConfig) -> Self {
        Self {
            payout_requests: payout_requests.clone(),
            config,
        }
    }

    pub fn is_allowlisted(&self, source: &str) -> bool {
        self.config.allowlist.iter().any(|s| s == source)
    }

    #[instrument(name = "rate_limit.check", skip(self), fields(n_recent), err)]
    pub async fn check(&self, source: &str) -> Result<(), RateLimitError> {
        if self.is_allowlisted(source) {
            return Ok(());
        }
        let since = Utc::now() - chrono::Duration::from_std(self.config.window)?;
        let n_recent = self
            .payout_requests
            .count_from_source_since(source, since)
            .await?;
        tracing::Span::current().record("n_recent", n_recent);
        if n_recent >= i64::from(self.config.max_per_window) {
            return Err(RateLimitError::Exceeded {
                max: self.config.max_per_window,
            });
        }
        Ok(())
    }
}
