//! The core replay orchestrator.

use crate::{ReplayError, ReplayReport, ReplayResult};
use alloy_primitives::{Address, Bytes, B256};
use hilo_engine::{EngineApi, EngineDriver, ExecutionPayloadV1, ForkchoiceState, PayloadAttributes};
use hilo_primitives::{ChainBlock, ReplayTransaction};
use hilo_providers::{LegacyChainProvider, TargetChainProvider};
use tracing::{debug, info, warn};

/// Mirrors legacy chain history onto the target chain, one block per cycle.
///
/// A cycle replays the legacy block directly above the target head: its
/// transactions are re-encoded and handed to the engine with the pool
/// suppressed, so the produced block carries exactly the legacy content.
/// The head only advances once the assembled payload has been checked
/// against the legacy block, keeping a failed cycle free of side effects.
#[derive(Debug)]
pub struct ReplayOrchestrator<L, T, E> {
    /// The legacy chain reader.
    legacy: L,
    /// The target chain reader.
    target: T,
    /// The engine driver commanding target block production.
    driver: EngineDriver<E>,
    /// The fee recipient set on every replayed block.
    fee_recipient: Address,
}

impl<L, T, E> ReplayOrchestrator<L, T, E>
where
    L: LegacyChainProvider,
    T: TargetChainProvider,
    E: EngineApi,
{
    /// Creates a new orchestrator over the given readers and driver.
    pub const fn new(legacy: L, target: T, driver: EngineDriver<E>, fee_recipient: Address) -> Self {
        Self { legacy, target, driver, fee_recipient }
    }

    /// The engine driver.
    pub const fn driver(&self) -> &EngineDriver<E> {
        &self.driver
    }

    /// Runs one replay cycle.
    ///
    /// Returns [ReplayReport::NoNewBlock] when the legacy chain has not
    /// produced the block above the target head yet, and
    /// [ReplayReport::Advanced] once that block has been replayed and the
    /// head moved onto it.
    pub async fn step(&mut self) -> ReplayResult<ReplayReport> {
        self.driver.reset();

        let head = self.target.head_block().await.map_err(ReplayError::TargetChain)?;
        let next = head.number + 1;

        let Some(legacy) =
            self.legacy.block_by_number(next).await.map_err(ReplayError::LegacyChain)?
        else {
            debug!(target: "replay", head = head.number, "No legacy block above the target head");
            return Ok(ReplayReport::NoNewBlock { head: head.number });
        };

        let transactions = self.legacy_transactions(&legacy).await?;
        let attributes = PayloadAttributes {
            timestamp: legacy.timestamp,
            prev_randao: B256::ZERO,
            suggested_fee_recipient: self.fee_recipient,
            transactions,
            no_tx_pool: true,
            gas_limit: Some(legacy.gas_limit),
        };
        let forkchoice = ForkchoiceState {
            head_block_hash: head.hash,
            safe_block_hash: head.hash,
            finalized_block_hash: head.hash,
        };

        let payload_id = self.driver.propose(forkchoice, attributes).await?;
        let payload = self.driver.fetch(payload_id).await?;
        check_payload(&legacy, &payload)?;
        self.driver.commit(&payload).await?;
        self.driver.advance_head(payload.block_hash).await?;
        self.verify_committed(&head, &legacy, &payload).await?;

        info!(
            target: "replay",
            number = next,
            hash = %payload.block_hash,
            transactions = payload.transactions.len(),
            "Replayed legacy block"
        );
        Ok(ReplayReport::Advanced {
            number: next,
            hash: payload.block_hash,
            transactions: payload.transactions.len(),
        })
    }

    /// Fetches and re-encodes every transaction of `block`.
    ///
    /// Each raw encoding must hash back to the hash the block lists for
    /// it, proving the legacy node served the bytes the block committed to.
    async fn legacy_transactions(&mut self, block: &ChainBlock) -> ReplayResult<Vec<Bytes>> {
        let mut encoded = Vec::with_capacity(block.transactions.len());
        for expected in &block.transactions {
            let raw = self
                .legacy
                .raw_transaction_by_hash(*expected)
                .await
                .map_err(ReplayError::LegacyChain)?;
            let got = raw.tx_hash();
            if got != *expected {
                return Err(ReplayError::HashMismatch {
                    number: block.number,
                    expected: *expected,
                    got,
                });
            }
            encoded.push(ReplayTransaction::from(raw).encoded());
        }
        Ok(encoded)
    }

    /// Re-reads the committed height from the target chain and checks it
    /// matches both the payload and the legacy block.
    ///
    /// A block the node has not exposed yet is not a failure: the engine
    /// already validated the payload, so the next cycle simply finds the
    /// head where this one left it.
    async fn verify_committed(
        &mut self,
        head: &ChainBlock,
        legacy: &ChainBlock,
        payload: &ExecutionPayloadV1,
    ) -> ReplayResult<()> {
        let number = legacy.number;
        let Some(committed) =
            self.target.block_by_number(number).await.map_err(ReplayError::TargetChain)?
        else {
            warn!(target: "replay", number, "Committed block not yet visible on the target chain");
            return Ok(());
        };

        if committed.hash != payload.block_hash {
            return Err(divergence(
                number,
                format!(
                    "committed hash {} does not match payload hash {}",
                    committed.hash, payload.block_hash
                ),
            ));
        }
        if !committed.is_child_of(head) {
            return Err(divergence(
                number,
                format!("committed block does not extend previous head {}", head.hash),
            ));
        }
        if committed.state_root != legacy.state_root {
            return Err(divergence(
                number,
                format!(
                    "committed state root {} does not match legacy root {}",
                    committed.state_root, legacy.state_root
                ),
            ));
        }
        if committed.receipts_root != legacy.receipts_root {
            return Err(divergence(
                number,
                format!(
                    "committed receipts root {} does not match legacy root {}",
                    committed.receipts_root, legacy.receipts_root
                ),
            ));
        }
        Ok(())
    }
}

/// Checks the assembled payload against the legacy block it must mirror.
///
/// Runs before the payload is committed: a diverging payload is abandoned
/// with the previous head still in place.
fn check_payload(legacy: &ChainBlock, payload: &ExecutionPayloadV1) -> ReplayResult<()> {
    let number = legacy.number;
    if payload.block_number != number {
        return Err(divergence(
            number,
            format!("payload height {} does not match", payload.block_number),
        ));
    }
    if payload.transactions.len() != legacy.transactions.len() {
        return Err(divergence(
            number,
            format!(
                "payload carries {} transactions, legacy block has {}",
                payload.transactions.len(),
                legacy.transactions.len()
            ),
        ));
    }
    for (bytes, expected) in payload.transactions.iter().zip(&legacy.transactions) {
        let decoded = ReplayTransaction::decode(bytes)?;
        let got = decoded.tx_hash();
        if got != *expected {
            return Err(divergence(
                number,
                format!("transaction {got} replaces legacy transaction {expected}"),
            ));
        }
        debug!(target: "replay", kind = decoded.kind(), hash = %got, "Verified payload transaction");
    }
    if payload.state_root != legacy.state_root {
        return Err(divergence(
            number,
            format!(
                "state root {} does not match legacy root {}",
                payload.state_root, legacy.state_root
            ),
        ));
    }
    if payload.receipts_root != legacy.receipts_root {
        return Err(divergence(
            number,
            format!(
                "receipts root {} does not match legacy root {}",
                payload.receipts_root, legacy.receipts_root
            ),
        ));
    }
    Ok(())
}

/// Builds a [ReplayError::Divergence] for the given height.
fn divergence(number: u64, reason: String) -> ReplayError {
    ReplayError::Divergence { number, reason }
}
