use serde::{Deserialize, Serialize};

use super::error::ApplicationError;
use crate::{
    amount::AmountConfig, consolidation::ConsolidationConfig, fees::FeesConfig, job::JobsConfig,
    rate_limit::RateLimitConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub amount: AmountConfig,
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub fees: FeesConfig,
    /// OP_RETURN payload attached to every payout and consolidation.
    #[serde(default = "default_memo")]
    pub memo: Option<String>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ApplicationError> {
        crate::amount::validate(&self.amount)?;
        self.consolidation.validate()?;
        if self.jobs.batch_page_size == 0 {
            return Err(ApplicationError::InvalidConfig(
                "jobs.batch_page_size must be positive".to_string(),
            ));
        }
        let intervals = [
            ("batch_interval", Some(self.jobs.batch_interval)),
            ("balance_refresh_interval", Some(self.jobs.balance_refresh_interval)),
            ("auto_consolidation_interval", self.jobs.auto_consolidation_interval),
        ];
        for (name, interval) in intervals {
            if interval.is_some_and(|i| i.is_zero()) {
                return Err(ApplicationError::InvalidConfig(format!(
                    "jobs.{name} must be positive"
                )));
            }
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jobs: JobsConfig::default(),
            amount: AmountConfig::default(),
            consolidation: ConsolidationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            fees: FeesConfig::default(),
            memo: default_memo(),
        }
    }
}

fn default_memo() -> Option<String> {
    Some("<3 faucet.coinbin.org <3".to_string())
}
