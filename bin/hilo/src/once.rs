//! One shot replay of the next legacy block.

use anyhow::Result;
use hilo_replay::{ReplayConfig, ReplayReport};
use tracing::info;

/// Performs a single replay cycle and reports its outcome.
pub(crate) async fn replay_once(config: ReplayConfig) -> Result<()> {
    let mut orchestrator = config.orchestrator();
    match orchestrator.step().await? {
        ReplayReport::Advanced { number, hash, transactions } => {
            info!(target: "hilo", number, transactions, %hash, "Replayed one legacy block");
        }
        ReplayReport::NoNewBlock { head } => {
            info!(target: "hilo", head, "Nothing to replay, the legacy chain has no newer block");
        }
        report => info!(target: "hilo", ?report, "Replay cycle finished"),
    }
    Ok(())
}
