//! This module contains the [ChainBlock] type.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// A block header view shared by the legacy chain and the target chain.
///
/// Both chains serve the standard `eth_getBlockByNumber` shape with
/// transaction hashes only, so a single type covers readers on either side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBlock {
    /// The block number.
    #[serde(with = "alloy_serde::quantity")]
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The parent block hash.
    pub parent_hash: B256,
    /// The block timestamp.
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
    /// The block gas limit.
    #[serde(with = "alloy_serde::quantity")]
    pub gas_limit: u64,
    /// The state root.
    pub state_root: B256,
    /// The receipts root.
    pub receipts_root: B256,
    /// Hashes of the transactions included in the block.
    #[serde(default)]
    pub transactions: Vec<B256>,
}

impl ChainBlock {
    /// Returns `true` if `self` extends `parent` by exactly one block.
    pub fn is_child_of(&self, parent: &Self) -> bool {
        self.parent_hash == parent.hash && self.number == parent.number + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_chain_block_deserialize() {
        let raw = r#"{
            "number": "0x1b4",
            "hash": "0xdc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae",
            "parentHash": "0xe99e022112df268087ea7eafaf4790497fd21dbeeb6bd7a1721df161a6657a54",
            "timestamp": "0x55ba467c",
            "gasLimit": "0x1388",
            "stateRoot": "0xd5855eb08b3387c0af375e9cdb6acfc05eb8f519e419b874b6ff2ffda7ed1dff",
            "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
            "miner": "0x4e65fda2159562a496f9f3522f89122a3088497a",
            "transactions": [
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b"
            ]
        }"#;

        let block: ChainBlock = serde_json::from_str(raw).unwrap();
        assert_eq!(block.number, 436);
        assert_eq!(block.timestamp, 1438271100);
        assert_eq!(block.gas_limit, 5000);
        assert_eq!(
            block.hash,
            b256!("dc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae")
        );
        assert_eq!(block.transactions.len(), 1);
    }

    #[test]
    fn test_chain_block_child_linkage() {
        let parent = ChainBlock {
            number: 10,
            hash: b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
            ..Default::default()
        };
        let child = ChainBlock {
            number: 11,
            parent_hash: parent.hash,
            ..Default::default()
        };
        assert!(child.is_child_of(&parent));

        let skipped = ChainBlock { number: 12, parent_hash: parent.hash, ..Default::default() };
        assert!(!skipped.is_child_of(&parent));
    }
}
