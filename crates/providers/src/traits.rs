//! Defines the [LegacyChainProvider] and [TargetChainProvider] traits.

use alloy_primitives::{Address, B256, U256};
use anyhow::Result;
use async_trait::async_trait;
use hilo_primitives::{ChainBlock, RawTransaction};

/// Describes a data source for the legacy chain whose history is replayed.
#[async_trait]
pub trait LegacyChainProvider {
    /// Returns the block at the given height, or `None` when the legacy
    /// chain has not reached it yet.
    async fn block_by_number(&mut self, number: u64) -> Result<Option<ChainBlock>>;

    /// Returns the canonical binary encoding of the transaction with the
    /// given hash, or an error if the data source does not know it.
    async fn raw_transaction_by_hash(&mut self, hash: B256) -> Result<RawTransaction>;

    /// Returns the current nonce of the cross domain messenger contract.
    async fn messenger_nonce(&mut self) -> Result<U256>;
}

/// Describes a data source for the target chain being driven forward.
#[async_trait]
pub trait TargetChainProvider {
    /// Returns the current head block of the target chain.
    async fn head_block(&mut self) -> Result<ChainBlock>;

    /// Returns the block at the given height, or `None` when the target
    /// chain has not reached it yet.
    async fn block_by_number(&mut self, number: u64) -> Result<Option<ChainBlock>>;

    /// Returns the balance of the given account.
    async fn balance(&mut self, address: Address) -> Result<U256>;

    /// Returns the bridged token balance of the given account.
    async fn token_balance(&mut self, address: Address) -> Result<U256>;

    /// Returns the number of transactions sent from the given account.
    async fn transaction_count(&mut self, address: Address) -> Result<u64>;

    /// Returns the current gas price of the target chain.
    async fn gas_price(&mut self) -> Result<u128>;

    /// Submits an encoded transaction to the target chain's pool,
    /// returning its hash.
    async fn send_raw_transaction(&mut self, tx: &RawTransaction) -> Result<B256>;
}
