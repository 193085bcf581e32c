//! Wire types for the block production protocol.
//!
//! The forkchoice and payload status shapes mirror what the target node
//! actually serves, including the two legacy status values the upstream
//! rpc types no longer carry.

use alloy_primitives::{Address, Bytes, B256};
use alloy_rpc_types_engine::PayloadId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The status of a payload, as reported by the target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadStatusCode {
    /// The payload is valid and part of the canonical chain.
    Valid,
    /// The payload is invalid.
    Invalid,
    /// The node is syncing and cannot judge the payload yet.
    Syncing,
    /// The payload was stored but not yet executed.
    Accepted,
    /// The payload's block hash does not match its contents.
    InvalidBlockHash,
    /// The payload descends from an invalid terminal block.
    InvalidTerminalBlock,
}

impl PayloadStatusCode {
    /// Returns `true` for statuses that mean "not decided yet" rather than
    /// a rejection. Commits observing these are retried, not failed.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Syncing | Self::Accepted)
    }
}

impl Display for PayloadStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "VALID"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Syncing => write!(f, "SYNCING"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::InvalidBlockHash => write!(f, "INVALID_BLOCK_HASH"),
            Self::InvalidTerminalBlock => write!(f, "INVALID_TERMINAL_BLOCK"),
        }
    }
}

/// The full payload status object returned by commit and propose calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadStatus {
    /// The status code.
    pub status: PayloadStatusCode,
    /// The hash of the most recent valid block known to the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_valid_hash: Option<B256>,
    /// A node-provided description of a validation failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

impl PayloadStatus {
    /// A status with no hash or error attached.
    pub const fn from_status(status: PayloadStatusCode) -> Self {
        Self { status, latest_valid_hash: None, validation_error: None }
    }

    /// A `VALID` status pointing at `hash`.
    pub const fn valid(hash: B256) -> Self {
        Self {
            status: PayloadStatusCode::Valid,
            latest_valid_hash: Some(hash),
            validation_error: None,
        }
    }

    /// Returns `true` if the status code is `VALID`.
    pub fn is_valid(&self) -> bool {
        self.status == PayloadStatusCode::Valid
    }
}

/// The response to a forkchoice update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkchoiceUpdated {
    /// The status of the head update, and of payload construction when
    /// attributes were supplied.
    pub payload_status: PayloadStatus,
    /// The identifier of the payload build job, when one was started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_id: Option<PayloadId>,
}

/// The attributes a propose call hands the target node for block building.
///
/// `transactions` and `no_tx_pool` force the produced block to contain
/// exactly the given transactions, which is the only mode replay uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAttributes {
    /// The timestamp of the block to build.
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
    /// The randomness seed, unused during replay and left zeroed.
    pub prev_randao: B256,
    /// The fee recipient of the block.
    pub suggested_fee_recipient: Address,
    /// The encoded transactions to include, in order.
    pub transactions: Vec<Bytes>,
    /// Suppresses the node's own transaction pool.
    pub no_tx_pool: bool,
    /// Overrides the block gas limit.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub gas_limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use serde_json::json;

    #[test]
    fn test_status_code_wire_names() {
        let cases = [
            (PayloadStatusCode::Valid, "VALID"),
            (PayloadStatusCode::Invalid, "INVALID"),
            (PayloadStatusCode::Syncing, "SYNCING"),
            (PayloadStatusCode::Accepted, "ACCEPTED"),
            (PayloadStatusCode::InvalidBlockHash, "INVALID_BLOCK_HASH"),
            (PayloadStatusCode::InvalidTerminalBlock, "INVALID_TERMINAL_BLOCK"),
        ];
        for (code, name) in cases {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(name));
            assert_eq!(
                serde_json::from_value::<PayloadStatusCode>(json!(name)).unwrap(),
                code
            );
            assert_eq!(code.to_string(), name);
        }
    }

    #[test]
    fn test_payload_status_tolerates_null_hash() {
        let raw = r#"{"status":"SYNCING","latestValidHash":null,"validationError":null}"#;
        let status: PayloadStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status.status, PayloadStatusCode::Syncing);
        assert!(status.latest_valid_hash.is_none());
        assert!(status.validation_error.is_none());
        assert!(status.status.is_retryable());
    }

    #[test]
    fn test_forkchoice_updated_deserialize() {
        let raw = r#"{
            "payloadStatus": {
                "status": "VALID",
                "latestValidHash": "0x3559e851470f6e7bbed1db474980683e8c315bfce99b2a6ef47c057c04de7858"
            },
            "payloadId": "0x0000000021f32cc1"
        }"#;
        let updated: ForkchoiceUpdated = serde_json::from_str(raw).unwrap();
        assert!(updated.payload_status.is_valid());
        assert_eq!(
            updated.payload_status.latest_valid_hash,
            Some(b256!("3559e851470f6e7bbed1db474980683e8c315bfce99b2a6ef47c057c04de7858"))
        );
        assert!(updated.payload_id.is_some());
    }

    #[test]
    fn test_attributes_serialize_with_gas_limit() {
        let attributes = PayloadAttributes {
            timestamp: 1_700_000_000,
            prev_randao: B256::ZERO,
            suggested_fee_recipient: address!("4200000000000000000000000000000000000011"),
            transactions: vec![Bytes::from(vec![0x7e, 0x01])],
            no_tx_pool: true,
            gas_limit: Some(11_000_000),
        };
        let value = serde_json::to_value(&attributes).unwrap();
        assert_eq!(value["timestamp"], json!("0x6553f100"));
        assert_eq!(value["noTxPool"], json!(true));
        assert_eq!(value["gasLimit"], json!("0xa7d8c0"));
        assert_eq!(value["transactions"], json!(["0x7e01"]));
        assert_eq!(
            value["suggestedFeeRecipient"],
            json!("0x4200000000000000000000000000000000000011")
        );
    }

    #[test]
    fn test_attributes_omit_absent_gas_limit() {
        let attributes = PayloadAttributes {
            timestamp: 1,
            prev_randao: B256::ZERO,
            suggested_fee_recipient: Address::ZERO,
            transactions: vec![],
            no_tx_pool: true,
            gas_limit: None,
        };
        let value = serde_json::to_value(&attributes).unwrap();
        assert!(value.get("gasLimit").is_none());
    }
}
