//! The replay service lifecycle.

use crate::{ReplayError, ReplayOrchestrator, ReplayReport, ReplayResult};
use hilo_engine::EngineApi;
use hilo_providers::{LegacyChainProvider, TargetChainProvider};
use std::time::Duration;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{error, info, warn};

/// Runs a [ReplayOrchestrator] on a fixed polling interval.
///
/// Stop requests are observed only between cycles: an in-flight cycle
/// always finishes its engine calls, so the target head is never left
/// mid-advance.
#[derive(Debug)]
pub struct ReplayService<L, T, E> {
    /// The orchestrator, present until the loop starts.
    orchestrator: Option<ReplayOrchestrator<L, T, E>>,
    /// The interval between polling ticks.
    poll_interval: Duration,
    /// Publisher side of the one-slot report outbox.
    reports_tx: Option<watch::Sender<ReplayReport>>,
    /// Observer side of the one-slot report outbox.
    reports: watch::Receiver<ReplayReport>,
    /// The stop signal.
    stop: watch::Sender<bool>,
    /// The running loop.
    handle: Option<JoinHandle<ReplayResult<()>>>,
}

impl<L, T, E> ReplayService<L, T, E>
where
    L: LegacyChainProvider + Send + 'static,
    T: TargetChainProvider + Send + 'static,
    E: EngineApi + Send + 'static,
{
    /// Creates a new service around `orchestrator`.
    pub fn new(orchestrator: ReplayOrchestrator<L, T, E>, poll_interval: Duration) -> Self {
        let (reports_tx, reports) = watch::channel(ReplayReport::Idle);
        let (stop, _) = watch::channel(false);
        Self {
            orchestrator: Some(orchestrator),
            poll_interval,
            reports_tx: Some(reports_tx),
            reports,
            stop,
            handle: None,
        }
    }

    /// Subscribes to the one-slot report outbox.
    ///
    /// The outbox holds only the most recent cycle outcome: a slow
    /// observer sees the latest report, never a queue of stale ones.
    pub fn reports(&self) -> watch::Receiver<ReplayReport> {
        self.reports.clone()
    }

    /// Starts the polling loop. Does nothing if already started.
    pub fn start(&mut self) {
        let Some(mut orchestrator) = self.orchestrator.take() else { return };
        let Some(reports) = self.reports_tx.take() else { return };
        let mut stop = self.stop.subscribe();
        let poll_interval = self.poll_interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = stop.changed() => {
                        info!(target: "replay", "Stop requested, exiting replay loop");
                        return Ok(());
                    }
                    _ = ticker.tick() => {}
                }
                match orchestrator.step().await {
                    Ok(report) => {
                        reports.send_replace(report);
                    }
                    Err(err) if err.is_transient() => {
                        warn!(target: "replay", %err, "Replay cycle failed, retrying on the next tick");
                        reports.send_replace(ReplayReport::Retrying { message: err.to_string() });
                    }
                    Err(err) => {
                        error!(target: "replay", %err, "Replay halted on a fatal error");
                        return Err(err);
                    }
                }
            }
        }));
    }

    /// Requests cooperative shutdown of the loop.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Blocks until the loop exits, returning its final result.
    ///
    /// Returns `Ok(())` after a requested stop; a fatal replay error
    /// propagates out as the loop's terminating error. Cancel safe: a
    /// cancelled wait leaves the loop running and can be awaited again.
    pub async fn wait(&mut self) -> ReplayResult<()> {
        let Some(handle) = self.handle.as_mut() else { return Ok(()) };
        let result = handle.await.map_err(|err| ReplayError::Task(err.to_string()));
        self.handle = None;
        result?
    }
}
