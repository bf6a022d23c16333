use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobsConfig {
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_batch_interval")]
    pub batch_interval: Duration,
    #[serde(default = "default_batch_page_size")]
    pub batch_page_size: u32,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_balance_refresh_interval")]
    pub balance_refresh_interval: Duration,
    /// Disabled when absent.
    #[serde_as(as = "Option<serde_with::DurationSeconds<u64>>")]
    #[serde(default)]
    pub auto_consolidation_interval: Option<Duration>,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: Duration,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            batch_interval: default_batch_interval(),
            batch_page_size: default_batch_page_size(),
            balance_refresh_interval: default_balance_refresh_interval(),
            auto_consolidation_interval: None,
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

fn default_batch_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_batch_page_size() -> u32 {
    50
}

fn default_balance_refresh_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}
