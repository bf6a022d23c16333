use anyhow::Context;
use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::{app::AppConfig, db::DbConfig, node::NodeConfig, tracing::TracingConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

pub struct EnvOverride {
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
}

impl Config {
    /// Without a path every section keeps its defaults. RPC credentials only
    /// ever come from the environment.
    pub fn from_path(
        path: Option<impl AsRef<Path>>,
        EnvOverride {
            rpc_user,
            rpc_password,
        }: EnvOverride,
    ) -> anyhow::Result<Self> {
        let mut config: Config = match path {
            Some(path) => {
                let config_file =
                    std::fs::read_to_string(path).context("Couldn't read config file")?;
                serde_yaml::from_str(&config_file).context("Couldn't parse config file")?
            }
            None => Config::default(),
        };

        config.node.rpc_user = rpc_user
            .filter(|u| !u.is_empty())
            .context("FAUCET_BITCOIN_RPC_USER is required")?;
        config.node.rpc_password = rpc_password
            .filter(|p| !p.is_empty())
            .context("FAUCET_BITCOIN_RPC_PASSWORD is required")?;

        Ok(config)
    }
}
