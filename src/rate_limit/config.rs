use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use std::time::Duration;

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_window")]
    pub window: Duration,
    #[serde(default = "default_allowlist")]
    pub allowlist: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window: default_window(),
            allowlist: default_allowlist(),
        }
    }
}

fn default_max_per_window() -> u32 {
    2
}

fn default_window() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_allowlist() -> Vec<String> {
    vec!["127.0.0.1".to_string()]
}
