//! Contains replay-related error types.

use alloy_primitives::B256;
use hilo_engine::EngineError;
use hilo_primitives::CodecError;

/// A [Result] alias where the error is [ReplayError].
pub type ReplayResult<T> = Result<T, ReplayError>;

/// An error that occurred while replaying legacy blocks.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// A legacy chain read failed.
    #[error("legacy chain read failed: {0}")]
    LegacyChain(#[source] anyhow::Error),
    /// A target chain read failed.
    #[error("target chain read failed: {0}")]
    TargetChain(#[source] anyhow::Error),
    /// An engine call failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A payload transaction failed to decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A legacy transaction's raw bytes hash to something other than the
    /// hash its own block lists for it.
    #[error("transaction hash mismatch in legacy block {number}: expected {expected}, got {got}")]
    HashMismatch {
        /// The height of the inconsistent legacy block.
        number: u64,
        /// The hash the legacy block lists.
        expected: B256,
        /// The hash of the raw bytes actually served.
        got: B256,
    },
    /// The target chain produced a block that does not mirror the legacy
    /// block it was built from.
    #[error("divergence at block {number}: {reason}")]
    Divergence {
        /// The replayed height.
        number: u64,
        /// What failed to match.
        reason: String,
    },
    /// The replay task ended abnormally.
    #[error("replay task failed: {0}")]
    Task(String),
}

impl ReplayError {
    /// Returns `true` when the next polling tick may succeed without
    /// operator intervention.
    ///
    /// Chain reads fail transiently with the network. Everything pointing
    /// at an inconsistency between the two chains is fatal: no retry can
    /// reconcile diverged histories.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::LegacyChain(_) | Self::TargetChain(_) => true,
            Self::Engine(err) => err.is_transient(),
            Self::Codec(_) | Self::HashMismatch { .. } | Self::Divergence { .. } | Self::Task(_) => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_classification() {
        assert!(ReplayError::LegacyChain(anyhow!("connection refused")).is_transient());
        assert!(ReplayError::TargetChain(anyhow!("timed out")).is_transient());
        assert!(ReplayError::Engine(EngineError::Timeout("engine_getPayloadV1")).is_transient());

        let mismatch = ReplayError::HashMismatch {
            number: 100,
            expected: B256::ZERO,
            got: B256::with_last_byte(1),
        };
        assert!(!mismatch.is_transient());
        assert!(!ReplayError::Divergence { number: 100, reason: "state root".into() }
            .is_transient());
        assert!(!ReplayError::Codec(CodecError::EmptyBytes).is_transient());
    }
}
