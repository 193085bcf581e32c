//! The block production driver.

use crate::{EngineApi, EngineError, EngineResult, PayloadAttributes};
use alloy_primitives::B256;
use alloy_rpc_types_engine::{ExecutionPayloadV1, ForkchoiceState, PayloadId};
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

/// The default deadline applied to each engine call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// The stages of a single block replay attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A payload build job was accepted.
    Proposed,
    /// The assembled payload was retrieved.
    Fetched,
    /// The payload was committed and reported `VALID`.
    Committed,
    /// The forkchoice now points at the committed block.
    HeadAdvanced,
    /// A step failed and the attempt was abandoned.
    Failed,
}

/// Sequences propose, fetch, commit and head advancement against an
/// [EngineApi], applying one deadline per call.
///
/// A failed step never advances the forkchoice. Whatever head the node
/// reported last stays in place, leaving the target chain where it was.
#[derive(Debug)]
pub struct EngineDriver<E> {
    api: E,
    call_timeout: Duration,
    state: DriverState,
}

impl<E: EngineApi> EngineDriver<E> {
    /// Creates a driver with the default call deadline.
    pub fn new(api: E) -> Self {
        Self::with_timeout(api, DEFAULT_CALL_TIMEOUT)
    }

    /// Creates a driver with a custom call deadline.
    pub const fn with_timeout(api: E, call_timeout: Duration) -> Self {
        Self { api, call_timeout, state: DriverState::Idle }
    }

    /// The underlying api handle.
    pub const fn api(&self) -> &E {
        &self.api
    }

    /// The state of the current attempt.
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Resets the driver for a fresh attempt.
    pub fn reset(&mut self) {
        self.state = DriverState::Idle;
    }

    /// Proposes a block built from `attributes` on top of
    /// `state.head_block_hash`, returning the accepted build job id.
    pub async fn propose(
        &mut self,
        state: ForkchoiceState,
        attributes: PayloadAttributes,
    ) -> EngineResult<PayloadId> {
        let call = Self::bounded(
            self.call_timeout,
            "engine_forkchoiceUpdatedV1",
            self.api.forkchoice_updated(state, Some(attributes)),
        )
        .await;
        let updated = match call {
            Ok(updated) => updated,
            Err(err) => return self.fail(err),
        };
        if !updated.payload_status.is_valid() {
            return self.fail(EngineError::UnexpectedStatus(updated.payload_status.status));
        }
        let Some(payload_id) = updated.payload_id else {
            return self.fail(EngineError::MissingPayloadId);
        };
        debug!(target: "engine", id = %payload_id, "Payload build job accepted");
        self.state = DriverState::Proposed;
        Ok(payload_id)
    }

    /// Fetches the payload assembled under `payload_id`.
    pub async fn fetch(&mut self, payload_id: PayloadId) -> EngineResult<ExecutionPayloadV1> {
        let call = Self::bounded(
            self.call_timeout,
            "engine_getPayloadV1",
            self.api.get_payload(payload_id),
        )
        .await;
        match call {
            Ok(payload) => {
                debug!(
                    target: "engine",
                    number = payload.block_number,
                    hash = %payload.block_hash,
                    "Fetched assembled payload"
                );
                self.state = DriverState::Fetched;
                Ok(payload)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Commits `payload` for execution.
    ///
    /// The only success is `VALID` with the node's latest valid hash equal
    /// to the payload's own block hash. `SYNCING` and `ACCEPTED` surface as
    /// retryable errors rather than success.
    pub async fn commit(&mut self, payload: &ExecutionPayloadV1) -> EngineResult<()> {
        let call = Self::bounded(
            self.call_timeout,
            "engine_newPayloadV1",
            self.api.new_payload(payload.clone()),
        )
        .await;
        let status = match call {
            Ok(status) => status,
            Err(err) => return self.fail(err),
        };
        if !status.is_valid() {
            return self.fail(EngineError::UnexpectedStatus(status.status));
        }
        if status.latest_valid_hash != Some(payload.block_hash) {
            return self.fail(EngineError::LatestValidHashMismatch {
                expected: payload.block_hash,
                got: status.latest_valid_hash,
            });
        }
        self.state = DriverState::Committed;
        Ok(())
    }

    /// Points the node's forkchoice at `head`, completing the attempt.
    ///
    /// Head, safe and finalized are pinned to the same hash: replay is
    /// linear and never reorgs, so no distinct safety levels are tracked.
    pub async fn advance_head(&mut self, head: B256) -> EngineResult<()> {
        let state = ForkchoiceState {
            head_block_hash: head,
            safe_block_hash: head,
            finalized_block_hash: head,
        };
        let call = Self::bounded(
            self.call_timeout,
            "engine_forkchoiceUpdatedV1",
            self.api.forkchoice_updated(state, None),
        )
        .await;
        let updated = match call {
            Ok(updated) => updated,
            Err(err) => return self.fail(err),
        };
        if !updated.payload_status.is_valid() {
            return self.fail(EngineError::UnexpectedStatus(updated.payload_status.status));
        }
        debug!(target: "engine", %head, "Head advanced");
        self.state = DriverState::HeadAdvanced;
        Ok(())
    }

    /// Marks the attempt failed and passes the error on.
    fn fail<T>(&mut self, err: EngineError) -> EngineResult<T> {
        warn!(target: "engine", state = ?self.state, %err, "Replay attempt failed");
        self.state = DriverState::Failed;
        Err(err)
    }

    /// Applies the call deadline to `future`.
    async fn bounded<T>(
        timeout: Duration,
        method: &'static str,
        future: impl Future<Output = EngineResult<T>>,
    ) -> EngineResult<T> {
        match tokio::time::timeout(timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::TestEngine, ForkchoiceUpdated, PayloadStatus, PayloadStatusCode};
    use alloy_primitives::{address, b256, Address, Bytes, U256};

    fn forkchoice(head: B256) -> ForkchoiceState {
        ForkchoiceState {
            head_block_hash: head,
            safe_block_hash: head,
            finalized_block_hash: head,
        }
    }

    fn attributes() -> PayloadAttributes {
        PayloadAttributes {
            timestamp: 1_700_000_000,
            prev_randao: B256::ZERO,
            suggested_fee_recipient: address_of_vault(),
            transactions: vec![Bytes::from(vec![0x7e, 0x01])],
            no_tx_pool: true,
            gas_limit: Some(11_000_000),
        }
    }

    fn address_of_vault() -> Address {
        address!("4200000000000000000000000000000000000011")
    }

    fn payload(hash: B256) -> ExecutionPayloadV1 {
        ExecutionPayloadV1 {
            parent_hash: b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
            fee_recipient: address_of_vault(),
            state_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: Default::default(),
            prev_randao: B256::ZERO,
            block_number: 1,
            gas_limit: 11_000_000,
            gas_used: 21_000,
            timestamp: 1_700_000_000,
            extra_data: Bytes::new(),
            base_fee_per_gas: U256::from(1_000u64),
            block_hash: hash,
            transactions: vec![Bytes::from(vec![0x7e, 0x01])],
        }
    }

    fn payload_id() -> PayloadId {
        serde_json::from_value(serde_json::json!("0x0000000021f32cc1")).unwrap()
    }

    fn accepted_job(hash: B256) -> ForkchoiceUpdated {
        ForkchoiceUpdated {
            payload_status: PayloadStatus::valid(hash),
            payload_id: Some(payload_id()),
        }
    }

    #[tokio::test]
    async fn test_full_attempt_walks_states() {
        let head = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        let built = b256!("00000000000000000000000000000000000000000000000000000000000000bb");

        let engine = TestEngine::default();
        engine.insert_forkchoice(Ok(accepted_job(head)));
        engine.insert_payload(Ok(payload(built)));
        engine.insert_commit(Ok(PayloadStatus::valid(built)));
        engine.insert_forkchoice(Ok(ForkchoiceUpdated {
            payload_status: PayloadStatus::valid(built),
            payload_id: None,
        }));

        let mut driver = EngineDriver::new(engine.clone());
        assert_eq!(driver.state(), DriverState::Idle);

        let id = driver.propose(forkchoice(head), attributes()).await.unwrap();
        assert_eq!(driver.state(), DriverState::Proposed);

        let fetched = driver.fetch(id).await.unwrap();
        assert_eq!(driver.state(), DriverState::Fetched);
        assert_eq!(fetched.block_hash, built);

        driver.commit(&fetched).await.unwrap();
        assert_eq!(driver.state(), DriverState::Committed);

        driver.advance_head(built).await.unwrap();
        assert_eq!(driver.state(), DriverState::HeadAdvanced);

        let forkchoice_calls = engine.forkchoice_calls();
        assert_eq!(forkchoice_calls.len(), 2);
        assert!(forkchoice_calls[0].1.is_some());
        assert!(forkchoice_calls[1].1.is_none());
        assert_eq!(forkchoice_calls[1].0, forkchoice(built));
    }

    #[tokio::test]
    async fn test_propose_rejects_non_valid_status() {
        let engine = TestEngine::default();
        engine.insert_forkchoice(Ok(ForkchoiceUpdated {
            payload_status: PayloadStatus::from_status(PayloadStatusCode::Syncing),
            payload_id: None,
        }));

        let mut driver = EngineDriver::new(engine);
        let err = driver.propose(forkchoice(B256::ZERO), attributes()).await.unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedStatus(PayloadStatusCode::Syncing)));
        assert!(err.is_transient());
        assert_eq!(driver.state(), DriverState::Failed);
    }

    #[tokio::test]
    async fn test_propose_requires_payload_id() {
        let engine = TestEngine::default();
        engine.insert_forkchoice(Ok(ForkchoiceUpdated {
            payload_status: PayloadStatus::valid(B256::ZERO),
            payload_id: None,
        }));

        let mut driver = EngineDriver::new(engine);
        let err = driver.propose(forkchoice(B256::ZERO), attributes()).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingPayloadId));
        assert!(!err.is_transient());
        assert_eq!(driver.state(), DriverState::Failed);
    }

    #[tokio::test]
    async fn test_commit_syncing_is_not_success() {
        let built = b256!("00000000000000000000000000000000000000000000000000000000000000bb");
        let engine = TestEngine::default();
        engine.insert_commit(Ok(PayloadStatus::from_status(PayloadStatusCode::Syncing)));

        let mut driver = EngineDriver::new(engine);
        let err = driver.commit(&payload(built)).await.unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedStatus(PayloadStatusCode::Syncing)));
        assert!(err.is_transient());
        assert_eq!(driver.state(), DriverState::Failed);
    }

    #[tokio::test]
    async fn test_commit_checks_latest_valid_hash() {
        let built = b256!("00000000000000000000000000000000000000000000000000000000000000bb");
        let other = b256!("00000000000000000000000000000000000000000000000000000000000000cc");
        let engine = TestEngine::default();
        engine.insert_commit(Ok(PayloadStatus::valid(other)));

        let mut driver = EngineDriver::new(engine);
        let err = driver.commit(&payload(built)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::LatestValidHashMismatch { expected, got: Some(got) }
                if expected == built && got == other
        ));
        assert!(!err.is_transient());
        assert_eq!(driver.state(), DriverState::Failed);
    }

    #[tokio::test]
    async fn test_calls_are_bounded_by_deadline() {
        let engine = TestEngine::hanging();
        let mut driver = EngineDriver::with_timeout(engine, Duration::ZERO);

        let err = driver.propose(forkchoice(B256::ZERO), attributes()).await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout("engine_forkchoiceUpdatedV1")));
        assert!(err.is_transient());
        assert_eq!(driver.state(), DriverState::Failed);
    }

    #[tokio::test]
    async fn test_advance_head_requires_valid() {
        let engine = TestEngine::default();
        engine.insert_forkchoice(Ok(ForkchoiceUpdated {
            payload_status: PayloadStatus::from_status(PayloadStatusCode::Invalid),
            payload_id: None,
        }));

        let mut driver = EngineDriver::new(engine);
        let err = driver.advance_head(B256::ZERO).await.unwrap_err();
        assert!(matches!(err, EngineError::UnexpectedStatus(PayloadStatusCode::Invalid)));
        assert_eq!(driver.state(), DriverState::Failed);

        driver.reset();
        assert_eq!(driver.state(), DriverState::Idle);
    }
}
