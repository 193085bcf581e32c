//! Contains the [RawTransaction] type.

use alloy_primitives::{keccak256, Bytes, B256};
use op_alloy_consensus::OpTxType;

/// An opaque, already-encoded transaction.
///
/// Raw bytes fetched from the legacy chain are carried through replay
/// verbatim, so re-encoding can never disturb byte-sensitive legacy
/// encodings.
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawTransaction(pub Bytes);

impl RawTransaction {
    /// Returns if the transaction is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns if the transaction is a deposit
    pub fn is_deposit(&self) -> bool {
        !self.0.is_empty() && self.0[0] == OpTxType::Deposit as u8
    }

    /// The transaction hash, the keccak digest of the encoded bytes.
    pub fn tx_hash(&self) -> B256 {
        keccak256(&self.0)
    }
}

impl<T: Into<Bytes>> From<T> for RawTransaction {
    fn from(bytes: T) -> Self {
        Self(bytes.into())
    }
}

impl AsRef<[u8]> for RawTransaction {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}
