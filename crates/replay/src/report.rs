//! Contains the [ReplayReport] published after each cycle.

use alloy_primitives::B256;

/// The latest observable outcome of the replay loop.
///
/// Reports flow through a one-slot outbox: an observer always sees the
/// most recent cycle and never queues up history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReplayReport {
    /// No cycle has completed yet.
    #[default]
    Idle,
    /// The legacy chain has no block above the target head.
    NoNewBlock {
        /// The target head height at the time of the check.
        head: u64,
    },
    /// A legacy block was replayed and the target head advanced.
    Advanced {
        /// The replayed height.
        number: u64,
        /// The committed block hash.
        hash: B256,
        /// The number of replayed transactions.
        transactions: usize,
    },
    /// The cycle failed transiently and will be retried on the next tick.
    Retrying {
        /// A human readable description of the failure.
        message: String,
    },
}
