use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_wallet_name")]
    pub wallet_name: String,
    #[serde(default, skip_serializing)]
    pub rpc_user: String,
    #[serde(default, skip_serializing)]
    pub rpc_password: String,
}

impl NodeConfig {
    pub fn wallet_endpoint(&self) -> String {
        format!(
            "{}/wallet/{}",
            self.endpoint.trim_end_matches('/'),
            self.wallet_name
        )
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            wallet_name: default_wallet_name(),
            rpc_user: String::new(),
            rpc_password: String::new(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:38332".to_string()
}

fn default_wallet_name() -> String {
    "faucet".to_string()
}
