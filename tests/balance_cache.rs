mod helpers;

use faucet::{balance::BalanceCache, primitives::*};

#[tokio::test]
async fn init_reads_before_any_refresh() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(420_000);

    let cache = BalanceCache::init(node.clone()).await;

    assert_eq!(cache.current().await, Satoshis::from(420_000u64));
    assert_eq!(node.state().balance_reads, 1);
    Ok(())
}

#[tokio::test]
async fn failed_or_zero_refresh_keeps_last_good_value() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(420_000);
    let cache = BalanceCache::init(node.clone()).await;

    node.fail_balances();
    cache.refresh().await;
    assert_eq!(cache.current().await, Satoshis::from(420_000u64));

    node.set_available(0);
    cache.refresh().await;
    assert_eq!(cache.current().await, Satoshis::from(420_000u64));

    node.set_available(99_000);
    cache.refresh().await;
    assert_eq!(cache.current().await, Satoshis::from(99_000u64));
    Ok(())
}

#[tokio::test]
async fn failed_init_starts_at_zero() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.fail_balances();

    let cache = BalanceCache::init(node.clone()).await;
    assert_eq!(cache.current().await, Satoshis::ZERO);

    node.set_available(10_000);
    cache.refresh().await;
    assert_eq!(cache.current().await, Satoshis::from(10_000u64));
    Ok(())
}
