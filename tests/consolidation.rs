mod helpers;

use rust_decimal_macros::dec;

use std::sync::Arc;

use faucet::{
    consolidation::{error::ConsolidationError, *},
    events::FaucetEvent,
    fees::FeeRate,
    node::{AddressType, TxInputs},
    primitives::*,
};

fn consolidator(
    node: &Arc<helpers::MockNode>,
    events: &Arc<helpers::RecordingEvents>,
    memo: Option<&str>,
) -> Consolidator {
    Consolidator::new(
        node.clone(),
        ConsolidationConfig::default(),
        FeeRate::from_sat_per_vb(dec!(0.15)),
        memo.map(str::to_string),
        events.clone(),
    )
}

#[tokio::test]
async fn nothing_small_enough_is_skipped() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.state().unspent = vec![helpers::utxo(0, 5_000_000), helpers::utxo(1, 500)];
    let events = helpers::RecordingEvents::new();

    let result = consolidator(&node, &events, None).consolidate().await?;

    assert_eq!(
        result,
        ConsolidationResult::Skipped(SkipReason::NoCandidates {
            threshold: Satoshis::from(100_000u64)
        })
    );
    assert!(node.broadcasts().is_empty());
    assert!(node.state().address_requests.is_empty());
    Ok(())
}

#[tokio::test]
async fn single_candidate_is_below_minimum() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.state().unspent = vec![helpers::utxo(0, 40_000), helpers::utxo(1, 900_000)];
    let events = helpers::RecordingEvents::new();

    let result = consolidator(&node, &events, None).consolidate().await?;

    assert_eq!(
        result,
        ConsolidationResult::Skipped(SkipReason::TooFewCandidates {
            found: 1,
            min_required: 2
        })
    );
    assert!(matches!(
        events.events().as_slice(),
        [FaucetEvent::ConsolidationSkipped { reason }] if reason.contains("need at least 2")
    ));
    Ok(())
}

#[tokio::test]
async fn output_is_inputs_minus_estimated_fee() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.state().unspent = vec![helpers::utxo(0, 30_000), helpers::utxo(1, 70_000)];
    let events = helpers::RecordingEvents::new();

    let result = consolidator(&node, &events, None).consolidate().await?;

    // (10.5 + 148 * 2 + 31) * 0.15 = 50.625 sats
    let ConsolidationResult::Consolidated {
        count,
        total_amount,
        estimated_vbytes,
        estimated_fee,
        output_amount,
        tx_id,
        address,
    } = result
    else {
        panic!("expected a consolidation, got {result:?}");
    };
    assert_eq!(count, 2);
    assert_eq!(total_amount, Satoshis::from(100_000u64));
    assert_eq!(estimated_vbytes, dec!(337.5));
    assert_eq!(estimated_fee, Satoshis::from(dec!(50.625)));
    assert_eq!(output_amount, Satoshis::from(99_949u64));

    let broadcasts = node.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let sent = &broadcasts[0];
    assert_eq!(sent.tx_id, tx_id);
    assert_eq!(sent.outputs.address, address);
    assert_eq!(sent.outputs.amount, output_amount);
    assert!(sent.fee_rate.is_none());
    let TxInputs::Pinned(outpoints) = &sent.inputs else {
        panic!("consolidation must pin its inputs");
    };
    let vouts: Vec<u32> = outpoints.iter().map(|o| o.vout).collect();
    assert_eq!(vouts, vec![1, 0]);

    assert_eq!(
        node.state().address_requests,
        vec![(Some("consolidated".to_string()), AddressType::Bech32)]
    );
    Ok(())
}

#[tokio::test]
async fn memo_adds_an_output_to_the_estimate() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.state().unspent = vec![helpers::utxo(0, 30_000), helpers::utxo(1, 70_000)];
    let events = helpers::RecordingEvents::new();

    let result = consolidator(&node, &events, Some("<3"))
        .consolidate()
        .await?;

    // 100_000 - 368.5 * 0.15 = 99_944.725, sent as 99_945 sats
    assert!(matches!(
        result,
        ConsolidationResult::Consolidated { estimated_vbytes, output_amount, .. }
            if estimated_vbytes == dec!(368.5) && output_amount == Satoshis::from(99_945u64)
    ));
    let sent = &node.broadcasts()[0];
    assert_eq!(sent.outputs.memo.as_deref(), Some("<3"));
    assert_eq!(sent.outputs.amount, Satoshis::from(99_945u64));
    Ok(())
}

#[tokio::test]
async fn takes_at_most_max_smallest_outputs() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.state().unspent = (0..8)
        .map(|i| helpers::utxo(i, 10_000 + u64::from(i) * 1_000))
        .collect();
    let events = helpers::RecordingEvents::new();

    let result = consolidator(&node, &events, None).consolidate().await?;

    assert!(matches!(
        result,
        ConsolidationResult::Consolidated { count: 5, .. }
    ));
    let TxInputs::Pinned(outpoints) = &node.broadcasts()[0].inputs else {
        panic!("consolidation must pin its inputs");
    };
    let vouts: Vec<u32> = outpoints.iter().map(|o| o.vout).collect();
    assert_eq!(vouts, vec![4, 3, 2, 1, 0]);
    Ok(())
}

#[tokio::test]
async fn fee_exceeding_inputs_is_an_error() -> anyhow::Result<()> {
    let node = helpers::MockNode::funded(0);
    node.state().unspent = vec![helpers::utxo(0, 1_000), helpers::utxo(1, 1_000)];
    let events = helpers::RecordingEvents::new();
    let consolidator = Consolidator::new(
        node.clone(),
        ConsolidationConfig::default(),
        FeeRate::from_sat_per_vb(dec!(10)),
        None,
        events.clone(),
    );

    let err = consolidator.consolidate().await.unwrap_err();

    assert!(matches!(
        err,
        ConsolidationError::AmountTooSmallToCoverFees { .. }
    ));
    assert!(node.broadcasts().is_empty());
    assert!(matches!(
        events.events().as_slice(),
        [FaucetEvent::ConsolidationFailed { .. }]
    ));
    Ok(())
}
