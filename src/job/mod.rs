mod config;
pub mod error;
mod process_batch;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::Instrument;

use std::{future::Future, time::Duration};

use crate::{balance::BalanceCache, consolidation::Consolidator};
pub use config::*;
use error::JobError;
pub use process_batch::*;

pub struct Jobs {
    shutdown: watch::Sender<bool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Jobs {
    pub fn start(
        config: &JobsConfig,
        processor: PayoutBatchProcessor,
        balance_cache: BalanceCache,
        consolidator: Option<Consolidator>,
    ) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let mut handles = Vec::new();

        handles.push((
            "batch_processor",
            spawn_periodic("batch_processor", config.batch_interval, rx.clone(), move || {
                let processor = processor.clone();
                async move { processor.process_batch().await.map(|_| ()) }
            }),
        ));

        handles.push((
            "balance_refresher",
            spawn_periodic(
                "balance_refresher",
                config.balance_refresh_interval,
                rx.clone(),
                move || {
                    let balance_cache = balance_cache.clone();
                    async move {
                        balance_cache.refresh().await;
                        Ok(())
                    }
                },
            ),
        ));

        if let (Some(period), Some(consolidator)) =
            (config.auto_consolidation_interval, consolidator)
        {
            handles.push((
                "auto_consolidation",
                spawn_periodic("auto_consolidation", period, rx.clone(), move || {
                    let consolidator = consolidator.clone();
                    async move { Ok(consolidator.consolidate().await.map(|_| ())?) }
                }),
            ));
        }

        Self { shutdown, handles }
    }

    pub fn job_names(&self) -> Vec<&'static str> {
        self.handles.iter().map(|(name, _)| *name).collect()
    }

    /// Signals every job and waits for them to finish their current tick.
    /// Jobs still running after `timeout` are aborted.
    pub async fn shutdown(self, timeout: Duration) -> Result<(), JobError> {
        let _ = self.shutdown.send(true);
        let aborts: Vec<_> = self
            .handles
            .iter()
            .map(|(_, handle)| handle.abort_handle())
            .collect();
        let handles = self.handles;
        let barrier = async move {
            for (name, handle) in handles {
                if let Err(err) = handle.await {
                    tracing::warn!(job = name, error = %err, "job ended abnormally");
                }
            }
        };
        match time::timeout(timeout, barrier).await {
            Ok(()) => {
                tracing::info!("all jobs stopped");
                Ok(())
            }
            Err(_) => {
                for abort in aborts {
                    abort.abort();
                }
                Err(JobError::ShutdownTimeout(timeout))
            }
        }
    }
}

fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), JobError>> + Send + 'static,
{
    tokio::spawn(async move {
        tracing::info!(job = name, ?period, "starting job");
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => run_tick(name, tick()).await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(job = name, "job stopped");
    })
}

/// Failures are recorded on the tick span; the job keeps its schedule.
async fn run_tick(name: &'static str, tick: impl Future<Output = Result<(), JobError>>) {
    let span = tracing::info_span!(
        "job.tick",
        job = name,
        error = tracing::field::Empty,
        error.level = tracing::field::Empty,
        error.message = tracing::field::Empty,
    );
    async move {
        if let Err(err) = tick.await {
            crate::tracing::insert_error_fields(tracing::Level::ERROR, &err);
            tracing::error!(job = name, error = %err, "job tick failed");
        }
    }
    .instrument(span)
    .await
}
