//! Test utilities for the chain reader traits.

use crate::{LegacyChainProvider, TargetChainProvider};
use alloy_primitives::{Address, B256, U256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use hilo_primitives::{ChainBlock, RawTransaction};

/// A mock legacy chain provider for testing.
#[derive(Debug, Clone, Default)]
pub struct TestLegacyChainProvider {
    /// Blocks by height.
    pub blocks: Vec<(u64, ChainBlock)>,
    /// Raw transactions by hash.
    pub transactions: Vec<(B256, RawTransaction)>,
    /// The messenger nonce.
    pub messenger_nonce: U256,
}

impl TestLegacyChainProvider {
    /// Inserts a block at the given height.
    pub fn insert_block(&mut self, number: u64, block: ChainBlock) {
        self.blocks.push((number, block));
    }

    /// Inserts a raw transaction under the given hash.
    pub fn insert_transaction(&mut self, hash: B256, raw: RawTransaction) {
        self.transactions.push((hash, raw));
    }
}

#[async_trait]
impl LegacyChainProvider for TestLegacyChainProvider {
    async fn block_by_number(&mut self, number: u64) -> Result<Option<ChainBlock>> {
        Ok(self.blocks.iter().find(|(n, _)| *n == number).map(|(_, b)| b.clone()))
    }

    async fn raw_transaction_by_hash(&mut self, hash: B256) -> Result<RawTransaction> {
        self.transactions
            .iter()
            .find(|(h, _)| *h == hash)
            .map(|(_, raw)| raw.clone())
            .ok_or_else(|| anyhow!("no transaction with hash {hash}"))
    }

    async fn messenger_nonce(&mut self) -> Result<U256> {
        Ok(self.messenger_nonce)
    }
}

/// A mock target chain provider for testing.
///
/// The head block is scripted independently of the block list so a test
/// can stage the post-commit view of a height before a cycle runs against
/// the old head.
#[derive(Debug, Clone, Default)]
pub struct TestTargetChainProvider {
    /// The current head block.
    pub head: Option<ChainBlock>,
    /// Blocks by height.
    pub blocks: Vec<(u64, ChainBlock)>,
    /// Account balances.
    pub balances: Vec<(Address, U256)>,
    /// Bridged token balances.
    pub token_balances: Vec<(Address, U256)>,
    /// Account transaction counts.
    pub nonces: Vec<(Address, u64)>,
    /// The gas price.
    pub gas_price: u128,
    /// Every transaction submitted through the provider.
    pub submitted: Vec<RawTransaction>,
}

impl TestTargetChainProvider {
    /// Sets the head block.
    pub fn insert_head(&mut self, block: ChainBlock) {
        self.head = Some(block);
    }

    /// Inserts a block at the given height.
    pub fn insert_block(&mut self, number: u64, block: ChainBlock) {
        self.blocks.push((number, block));
    }

    /// Sets the balance of an account.
    pub fn insert_balance(&mut self, address: Address, balance: U256) {
        self.balances.push((address, balance));
    }

    /// Sets the bridged token balance of an account.
    pub fn insert_token_balance(&mut self, address: Address, balance: U256) {
        self.token_balances.push((address, balance));
    }
}

#[async_trait]
impl TargetChainProvider for TestTargetChainProvider {
    async fn head_block(&mut self) -> Result<ChainBlock> {
        self.head.clone().ok_or_else(|| anyhow!("no head block"))
    }

    async fn block_by_number(&mut self, number: u64) -> Result<Option<ChainBlock>> {
        Ok(self.blocks.iter().find(|(n, _)| *n == number).map(|(_, b)| b.clone()))
    }

    async fn balance(&mut self, address: Address) -> Result<U256> {
        Ok(self
            .balances
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, balance)| *balance)
            .unwrap_or_default())
    }

    async fn token_balance(&mut self, address: Address) -> Result<U256> {
        Ok(self
            .token_balances
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, balance)| *balance)
            .unwrap_or_default())
    }

    async fn transaction_count(&mut self, address: Address) -> Result<u64> {
        Ok(self
            .nonces
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, nonce)| *nonce)
            .unwrap_or_default())
    }

    async fn gas_price(&mut self) -> Result<u128> {
        Ok(self.gas_price)
    }

    async fn send_raw_transaction(&mut self, tx: &RawTransaction) -> Result<B256> {
        self.submitted.push(tx.clone());
        Ok(tx.tx_hash())
    }
}
