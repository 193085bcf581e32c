//! Continuous replay of the legacy chain.

use anyhow::Result;
use hilo_replay::{ReplayConfig, ReplayReport};
use tracing::info;

/// Runs the replay service until it halts or an interrupt arrives.
///
/// The report channel is consumed here as a progress feed; a second
/// ctrl-c is not handled, the process is simply torn down by the
/// runtime on exit.
pub(crate) async fn replay(config: ReplayConfig) -> Result<()> {
    let mut service = config.service();
    let mut reports = service.reports();
    service.start();

    tokio::spawn(async move {
        while reports.changed().await.is_ok() {
            let report = reports.borrow_and_update().clone();
            if let ReplayReport::Advanced { number, hash, transactions } = report {
                info!(target: "hilo", number, transactions, %hash, "Replay advanced");
            }
        }
    });

    let outcome = tokio::select! {
        res = service.wait() => Some(res),
        _ = tokio::signal::ctrl_c() => None,
    };
    match outcome {
        Some(res) => res?,
        None => {
            info!(target: "hilo", "Interrupt received, stopping after the current cycle");
            service.stop();
            service.wait().await?;
        }
    }
    Ok(())
}
