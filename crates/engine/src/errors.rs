//! Contains engine-related error types.

use crate::PayloadStatusCode;
use alloy_primitives::B256;
use thiserror::Error;

/// A [Result] type for the [EngineError].
pub type EngineResult<T> = Result<T, EngineError>;

/// An error surfaced while driving block production on the target node.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The transport failed before a response arrived.
    #[error("Engine transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The auth token could not be produced from the secret.
    #[error("Engine auth error: {0}")]
    Auth(#[from] jsonwebtoken::errors::Error),
    /// A request or response failed to serialize.
    #[error("Engine serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The node answered with a JSON-RPC error object.
    #[error("Engine rpc error {code}: {message}")]
    Rpc {
        /// The error code.
        code: i64,
        /// The error message.
        message: String,
    },
    /// The node answered with neither a result nor an error.
    #[error("Engine rpc response carried no result")]
    MissingResult,
    /// A call exceeded its deadline.
    #[error("Engine call timed out: {0}")]
    Timeout(&'static str),
    /// A propose call with attributes returned no payload id.
    #[error("Forkchoice update returned no payload id")]
    MissingPayloadId,
    /// A call returned a status other than the one required to proceed.
    #[error("Unexpected payload status: {0}")]
    UnexpectedStatus(PayloadStatusCode),
    /// A commit reported `VALID` for a different block than the one
    /// submitted.
    #[error("Latest valid hash mismatch: expected {expected}, got {got:?}")]
    LatestValidHashMismatch {
        /// The submitted block hash.
        expected: B256,
        /// The hash the node reported as its latest valid block.
        got: Option<B256>,
    },
}

impl EngineError {
    /// Returns `true` when retrying the same call later may succeed.
    ///
    /// Transport faults and undecided payload statuses are transient.
    /// Rejections and mismatched hashes are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Rpc { .. } | Self::MissingResult | Self::Timeout(_) => true,
            Self::UnexpectedStatus(code) => code.is_retryable(),
            Self::Auth(_)
            | Self::Serde(_)
            | Self::MissingPayloadId
            | Self::LatestValidHashMismatch { .. } => false,
        }
    }
}
