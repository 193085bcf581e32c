//! Deposit transaction builders and source hashing.

use crate::{
    apply_l1_to_l2_alias, bridge_relay_calldata, L1_MESSENGER_ADDRESS, L2_MESSENGER_ADDRESS,
};
use alloy_primitives::{keccak256, Address, Bytes, TxKind, B256, U256};
use op_alloy_consensus::TxDeposit;
use std::collections::HashMap;

/// Identifier of the user deposit source domain.
pub const USER_DEPOSIT_SOURCE_DOMAIN: u64 = 0;

/// The gas limit granted to every synthesized deposit.
pub const DEPOSIT_GAS_LIMIT: u64 = 15_000_000;

/// A user deposit transaction source.
///
/// Replayed deposits have no real originating event, so sources are minted
/// from a synthetic origin block hash and log index. The resulting source
/// hash must be unique per deposit or the target node rejects the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserDepositSource {
    /// The origin block hash attributed to the deposit.
    pub origin_block_hash: B256,
    /// The log index within the origin block.
    pub log_index: u64,
}

impl UserDepositSource {
    /// Creates a new [UserDepositSource].
    pub const fn new(origin_block_hash: B256, log_index: u64) -> Self {
        Self { origin_block_hash, log_index }
    }

    /// Creates a source from random origin coordinates.
    pub fn random() -> Self {
        Self::new(Self::mock_origin_hash(rand::random()), rand::random())
    }

    /// A synthetic origin block hash carrying `num` in its first eight
    /// bytes, tagged in the final byte.
    pub fn mock_origin_hash(num: u64) -> B256 {
        let mut out = B256::ZERO;
        out[..8].copy_from_slice(&num.to_be_bytes());
        out[31] = 1;
        out
    }

    /// Returns the source hash.
    ///
    /// Computed as `keccak256(domain, keccak256(origin_block_hash, log_index))`
    /// with every field packed into a 32 byte word.
    pub fn source_hash(&self) -> B256 {
        let mut input = [0u8; 32 * 2];
        input[..32].copy_from_slice(&self.origin_block_hash[..]);
        input[32 * 2 - 8..].copy_from_slice(&self.log_index.to_be_bytes());
        let deposit_id_hash = keccak256(input);
        let mut domain_input = [0u8; 32 * 2];
        domain_input[32 - 8..32].copy_from_slice(&USER_DEPOSIT_SOURCE_DOMAIN.to_be_bytes());
        domain_input[32..].copy_from_slice(&deposit_id_hash[..]);
        keccak256(domain_input)
    }
}

/// A value-minting deposit crediting `amount` of native currency to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthDeposit {
    /// The account the deposit executes as, credited with the mint.
    pub from: Address,
    /// The account the minted value is transferred to.
    pub to: Address,
    /// The amount minted and transferred, in wei.
    pub amount: u128,
}

impl EthDeposit {
    /// Materializes the deposit transaction under `source`.
    pub fn into_deposit(self, source: UserDepositSource) -> TxDeposit {
        TxDeposit {
            source_hash: source.source_hash(),
            from: self.from,
            to: TxKind::Call(self.to),
            mint: Some(self.amount),
            value: U256::from(self.amount),
            gas_limit: DEPOSIT_GAS_LIMIT,
            is_system_transaction: false,
            input: Bytes::new(),
        }
    }
}

/// A token-minting deposit relayed as a bridge message to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDeposit {
    /// The account credited with bridged tokens on the target chain.
    pub recipient: Address,
    /// The token amount bridged.
    pub amount: U256,
    /// The messenger nonce carried by the relay envelope.
    pub nonce: U256,
}

impl TokenDeposit {
    /// Materializes the deposit transaction under `source`.
    ///
    /// The deposit executes as the aliased L1 messenger calling the L2
    /// messenger predeploy. No native value is minted; the token mint
    /// happens inside the bridge finalization the calldata carries.
    pub fn into_deposit(self, source: UserDepositSource) -> TxDeposit {
        TxDeposit {
            source_hash: source.source_hash(),
            from: apply_l1_to_l2_alias(L1_MESSENGER_ADDRESS),
            to: TxKind::Call(L2_MESSENGER_ADDRESS),
            mint: None,
            value: U256::ZERO,
            gas_limit: DEPOSIT_GAS_LIMIT,
            is_system_transaction: false,
            input: bridge_relay_calldata(self.recipient, self.amount, self.nonce),
        }
    }
}

/// Encodes a messenger nonce with its version packed into the top two bytes.
pub fn encode_versioned_nonce(nonce: U256, version: u16) -> U256 {
    (U256::from(version) << 240) | nonce
}

/// Allocates relay nonces for message-carrying deposits.
///
/// The legacy messenger's nonce does not advance while replaying, so reusing
/// the observed value would collide after the first deposit to a destination.
/// The allocator hands out a strictly increasing sequence per destination
/// instead, continuing from a seed nonce.
#[derive(Debug, Clone)]
pub struct DepositNonces {
    seed: U256,
    next: HashMap<Address, U256>,
}

impl DepositNonces {
    /// Creates an allocator starting a fresh version 1 nonce sequence.
    pub fn new() -> Self {
        Self::with_seed(encode_versioned_nonce(U256::ZERO, 1))
    }

    /// Creates an allocator continuing from `seed`, typically the messenger
    /// nonce observed on chain.
    pub fn with_seed(seed: U256) -> Self {
        Self { seed, next: HashMap::new() }
    }

    /// Returns the next nonce for `destination` and advances its sequence.
    pub fn next(&mut self, destination: Address) -> U256 {
        let slot = self.next.entry(destination).or_insert(self.seed);
        let nonce = *slot;
        *slot += U256::from(1);
        nonce
    }
}

impl Default for DepositNonces {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relayMessageCall;
    use alloy_primitives::address;
    use alloy_sol_types::SolCall;
    use std::collections::HashSet;

    #[test]
    fn test_mock_origin_hash_layout() {
        let hash = UserDepositSource::mock_origin_hash(0x0102030405060708);
        assert_eq!(&hash[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(hash[31], 1);
        assert!(hash[8..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_source_hash_sensitive_to_coordinates() {
        let base = UserDepositSource::new(UserDepositSource::mock_origin_hash(1), 0);
        let bumped_index = UserDepositSource::new(UserDepositSource::mock_origin_hash(1), 1);
        let bumped_block = UserDepositSource::new(UserDepositSource::mock_origin_hash(2), 0);

        assert_eq!(base.source_hash(), base.source_hash());
        assert_ne!(base.source_hash(), bumped_index.source_hash());
        assert_ne!(base.source_hash(), bumped_block.source_hash());
    }

    #[test]
    fn test_source_hash_unique_over_many_sources() {
        let hashes: HashSet<_> =
            (0..10_000).map(|_| UserDepositSource::random().source_hash()).collect();
        assert_eq!(hashes.len(), 10_000);
    }

    #[test]
    fn test_eth_deposit_shape() {
        let from = address!("de3829a23df1479438622a08a116e8eb3f620bb5");
        let to = address!("a83114a443da1cecefc50368531cace9f37fcccb");
        let deposit =
            EthDeposit { from, to, amount: 100 }.into_deposit(UserDepositSource::random());

        assert_eq!(deposit.from, from);
        assert_eq!(deposit.to, TxKind::Call(to));
        assert_eq!(deposit.mint, Some(100));
        assert_eq!(deposit.value, U256::from(100u64));
        assert_eq!(deposit.gas_limit, DEPOSIT_GAS_LIMIT);
        assert!(deposit.input.is_empty());
        assert!(!deposit.is_system_transaction);
    }

    #[test]
    fn test_token_deposit_shape() {
        let recipient = address!("a83114a443da1cecefc50368531cace9f37fcccb");
        let deposit = TokenDeposit { recipient, amount: U256::from(42u64), nonce: U256::from(9u64) }
            .into_deposit(UserDepositSource::random());

        assert_eq!(deposit.from, apply_l1_to_l2_alias(L1_MESSENGER_ADDRESS));
        assert_eq!(deposit.to, TxKind::Call(L2_MESSENGER_ADDRESS));
        assert_eq!(deposit.mint, None);
        assert_eq!(deposit.value, U256::ZERO);

        let relay = relayMessageCall::abi_decode(&deposit.input, true).unwrap();
        assert_eq!(relay._nonce, U256::from(9u64));
    }

    #[test]
    fn test_versioned_nonce_layout() {
        let nonce = encode_versioned_nonce(U256::from(5u64), 1);
        let bytes = nonce.to_be_bytes::<32>();
        assert_eq!(&bytes[..2], &[0, 1]);
        assert_eq!(bytes[31], 5);
        assert!(bytes[2..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_nonce_allocator_monotonic_per_destination() {
        let seed = encode_versioned_nonce(U256::from(100u64), 1);
        let mut nonces = DepositNonces::with_seed(seed);
        let a = address!("0000000000000000000000000000000000000001");
        let b = address!("0000000000000000000000000000000000000002");

        assert_eq!(nonces.next(a), seed);
        assert_eq!(nonces.next(a), seed + U256::from(1));
        assert_eq!(nonces.next(b), seed);
        assert_eq!(nonces.next(a), seed + U256::from(2));
        assert_eq!(nonces.next(b), seed + U256::from(1));
    }
}
