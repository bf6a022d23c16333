mod helpers;

use rust_decimal_macros::dec;

use std::time::Duration;

use faucet::{app::*, balance::BalanceCache, fees::FeeRate, job::*, payout::*};

fn fast_jobs() -> JobsConfig {
    JobsConfig {
        batch_interval: Duration::from_millis(50),
        balance_refresh_interval: Duration::from_millis(50),
        auto_consolidation_interval: Some(Duration::from_millis(50)),
        ..Default::default()
    }
}

#[tokio::test]
#[serial_test::serial]
async fn jobs_drain_the_queue_and_stop_on_shutdown() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let repo = PayoutRequests::new(&pool);
    let node = helpers::MockNode::funded(100_000_000);
    node.state().unspent = vec![helpers::utxo(0, 20_000), helpers::utxo(1, 30_000)];
    let config = AppConfig {
        jobs: fast_jobs(),
        ..Default::default()
    };
    let app = App::init(
        pool,
        node.clone(),
        "faucet",
        config,
        helpers::RecordingEvents::new(),
    )
    .await?;
    let request = app
        .submit(&helpers::random_signet_address(), "127.0.0.1", None)
        .await?;

    let jobs = app.start_jobs().await?;
    assert_eq!(
        jobs.job_names(),
        vec!["batch_processor", "balance_refresher", "auto_consolidation"]
    );
    tokio::time::sleep(Duration::from_millis(400)).await;
    jobs.shutdown(Duration::from_secs(5)).await?;

    assert_eq!(
        repo.find_by_id(request.id).await?.status,
        PayoutStatus::Broadcast
    );
    assert!(node.state().balance_reads >= 2);
    let n_broadcasts = node.broadcasts().len();
    assert!(n_broadcasts >= 2);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(node.broadcasts().len(), n_broadcasts);
    Ok(())
}

#[tokio::test]
#[serial_test::serial]
async fn auto_consolidation_is_off_by_default() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let node = helpers::MockNode::funded(100_000_000);
    let app = App::init(
        pool,
        node.clone(),
        "faucet",
        AppConfig::default(),
        helpers::RecordingEvents::new(),
    )
    .await?;

    let jobs = app.start_jobs().await?;
    assert_eq!(jobs.job_names(), vec!["batch_processor", "balance_refresher"]);
    jobs.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

#[tokio::test]
#[serial_test::serial]
async fn restart_right_after_a_crash_fails_in_flight_records() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let repo = PayoutRequests::new(&pool);
    let node = helpers::MockNode::funded(100_000_000);
    let config = AppConfig {
        jobs: fast_jobs(),
        ..Default::default()
    };
    let app = App::init(
        pool,
        node.clone(),
        "faucet",
        config,
        helpers::RecordingEvents::new(),
    )
    .await?;
    let request = app
        .submit(&helpers::random_signet_address(), "127.0.0.1", None)
        .await?;
    repo.mark_processing(request.id).await?;

    let jobs = app.start_jobs().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    jobs.shutdown(Duration::from_secs(5)).await?;

    let swept = repo.find_by_id(request.id).await?;
    assert_eq!(swept.status, PayoutStatus::Failed);
    assert!(swept.error_message.is_some());
    assert!(node.broadcasts().is_empty());
    Ok(())
}

#[tokio::test]
#[serial_test::serial]
async fn idle_jobs_stop_without_waiting_for_a_tick() -> anyhow::Result<()> {
    let pool = helpers::init_pool().await?;
    let repo = PayoutRequests::new(&pool);
    let node = helpers::MockNode::funded(100_000_000);
    let processor = PayoutBatchProcessor::new(
        &repo,
        node.clone(),
        helpers::RecordingEvents::new(),
        FeeRate::from_sat_per_vb(dec!(0.115)),
        None,
        50,
    );
    let balance_cache = BalanceCache::init(node.clone()).await;
    let config = JobsConfig {
        batch_interval: Duration::from_secs(3600),
        balance_refresh_interval: Duration::from_secs(3600),
        ..Default::default()
    };

    let jobs = Jobs::start(&config, processor, balance_cache, None);
    let res = jobs.shutdown(Duration::from_secs(1)).await;

    assert!(res.is_ok());
    assert_eq!(node.state().balance_reads, 1);
    Ok(())
}
