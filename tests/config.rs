use rust_decimal_macros::dec;

use std::{io::Write, time::Duration};

use faucet::cli::{Config, EnvOverride};

fn credentials() -> EnvOverride {
    EnvOverride {
        rpc_user: Some("faucet".to_string()),
        rpc_password: Some("hunter2".to_string()),
    }
}

#[test]
fn file_overrides_merge_with_defaults() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"
node:
  endpoint: http://signet-node:38332
app:
  jobs:
    batch_interval: 30
    auto_consolidation_interval: 3600
  amount:
    enabled_tiers: [1, 2, 3, 4]
  rate_limit:
    max_per_window: 5
  memo: ~
"#
    )?;

    let config = Config::from_path(Some(file.path()), credentials())?;

    assert_eq!(config.node.endpoint, "http://signet-node:38332");
    assert_eq!(config.node.wallet_name, "faucet");
    assert_eq!(
        config.node.wallet_endpoint(),
        "http://signet-node:38332/wallet/faucet"
    );
    assert_eq!(config.node.rpc_password, "hunter2");
    assert_eq!(config.app.jobs.batch_interval, Duration::from_secs(30));
    assert_eq!(config.app.jobs.batch_page_size, 50);
    assert_eq!(
        config.app.jobs.auto_consolidation_interval,
        Some(Duration::from_secs(3600))
    );
    assert_eq!(config.app.amount.enabled_tiers, vec![1, 2, 3, 4]);
    assert_eq!(config.app.amount.default_tier, 2);
    assert_eq!(config.app.rate_limit.max_per_window, 5);
    assert_eq!(config.app.rate_limit.window, Duration::from_secs(86_400));
    assert_eq!(config.app.memo, None);
    assert_eq!(config.app.fees.payout_fee_multiplier, dec!(1.15));
    Ok(())
}

#[test]
fn no_file_means_defaults() -> anyhow::Result<()> {
    let config = Config::from_path(None::<&str>, credentials())?;

    assert_eq!(config.app, faucet::app::AppConfig::default());
    assert_eq!(config.app.jobs.auto_consolidation_interval, None);
    assert_eq!(
        config.app.memo.as_deref(),
        Some("<3 faucet.coinbin.org <3")
    );
    Ok(())
}

#[test]
fn missing_credentials_are_rejected() {
    let err = Config::from_path(
        None::<&str>,
        EnvOverride {
            rpc_user: None,
            rpc_password: Some("hunter2".to_string()),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("FAUCET_BITCOIN_RPC_USER"));

    let err = Config::from_path(
        None::<&str>,
        EnvOverride {
            rpc_user: Some("faucet".to_string()),
            rpc_password: Some(String::new()),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("FAUCET_BITCOIN_RPC_PASSWORD"));
}

#[test]
fn credentials_are_never_serialized() -> anyhow::Result<()> {
    let config = Config::from_path(None::<&str>, credentials())?;

    let rendered = serde_yaml::to_string(&config)?;

    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("rpc_user"));
    Ok(())
}
