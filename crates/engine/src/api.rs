//! Contains the [EngineApi] trait.

use crate::{EngineResult, ForkchoiceUpdated, PayloadAttributes, PayloadStatus};
use alloy_rpc_types_engine::{ExecutionPayloadV1, ForkchoiceState, PayloadId};
use async_trait::async_trait;

/// The three block production calls the target node's control endpoint
/// serves.
///
/// Implementors speak the authenticated engine protocol; tests substitute
/// scripted stand-ins.
#[async_trait]
pub trait EngineApi {
    /// Updates the node's forkchoice, optionally starting a payload build
    /// job when `attributes` are supplied.
    async fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        attributes: Option<PayloadAttributes>,
    ) -> EngineResult<ForkchoiceUpdated>;

    /// Fetches the payload assembled under `payload_id`.
    async fn get_payload(&self, payload_id: PayloadId) -> EngineResult<ExecutionPayloadV1>;

    /// Submits `payload` for execution and validation.
    async fn new_payload(&self, payload: ExecutionPayloadV1) -> EngineResult<PayloadStatus>;
}
