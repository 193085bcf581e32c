//! Providers that use alloy provider types on the backend.

use crate::{LegacyChainProvider, TargetChainProvider};
use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_provider::{Provider, ReqwestProvider};
use alloy_sol_types::SolCall;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use hilo_primitives::{
    balanceOfCall, messageNonceCall, ChainBlock, RawTransaction, L1_MESSENGER_ADDRESS,
    L2_TOKEN_ADDRESS,
};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use tracing::{debug, trace};

const CACHE_SIZE: usize = 16;

/// A minimal `eth_call` request body.
#[derive(Debug, Clone, Serialize)]
struct CallRequest {
    /// The call target.
    to: Address,
    /// The ABI encoded calldata.
    data: Bytes,
}

/// Performs an `eth_call` against the latest block.
async fn eth_call(inner: &ReqwestProvider, to: Address, data: Bytes) -> Result<Bytes> {
    let ret: Bytes = inner
        .raw_request("eth_call".into(), (CallRequest { to, data }, "latest"))
        .await?;
    Ok(ret)
}

/// Fetches the block at the given height with transaction hashes only,
/// returning `None` when the chain has not reached it.
async fn block_by_number(inner: &ReqwestProvider, number: u64) -> Result<Option<ChainBlock>> {
    let block: Option<ChainBlock> = inner
        .raw_request("eth_getBlockByNumber".into(), (U64::from(number), false))
        .await?;
    Ok(block)
}

/// The [AlloyLegacyChainProvider] is a concrete implementation of the
/// [LegacyChainProvider] trait, providing legacy chain data over Ethereum
/// JSON-RPC using an alloy provider as the backend.
#[derive(Debug, Clone)]
pub struct AlloyLegacyChainProvider {
    /// The inner Ethereum JSON-RPC provider.
    inner: ReqwestProvider,
    /// `block_by_number` LRU cache.
    block_by_number_cache: LruCache<u64, ChainBlock>,
    /// `raw_transaction_by_hash` LRU cache.
    raw_transaction_by_hash_cache: LruCache<B256, RawTransaction>,
}

impl AlloyLegacyChainProvider {
    /// Creates a new [AlloyLegacyChainProvider] with the given alloy provider.
    pub fn new(inner: ReqwestProvider) -> Self {
        Self {
            inner,
            block_by_number_cache: LruCache::new(NonZeroUsize::new(CACHE_SIZE).unwrap()),
            raw_transaction_by_hash_cache: LruCache::new(NonZeroUsize::new(CACHE_SIZE).unwrap()),
        }
    }

    /// Creates a new [AlloyLegacyChainProvider] from the provided [reqwest::Url].
    pub fn new_http(url: reqwest::Url) -> Self {
        Self::new(ReqwestProvider::new_http(url))
    }

    /// Returns the chain ID.
    pub async fn chain_id(&mut self) -> Result<u64> {
        Ok(self.inner.get_chain_id().await?)
    }
}

#[async_trait]
impl LegacyChainProvider for AlloyLegacyChainProvider {
    async fn block_by_number(&mut self, number: u64) -> Result<Option<ChainBlock>> {
        if let Some(block) = self.block_by_number_cache.get(&number) {
            return Ok(Some(block.clone()));
        }

        let block = block_by_number(&self.inner, number).await?;
        if let Some(block) = &block {
            self.block_by_number_cache.put(number, block.clone());
        }
        Ok(block)
    }

    async fn raw_transaction_by_hash(&mut self, hash: B256) -> Result<RawTransaction> {
        if let Some(raw) = self.raw_transaction_by_hash_cache.get(&hash) {
            return Ok(raw.clone());
        }

        let raw: Option<Bytes> = self
            .inner
            .raw_request("eth_getRawTransactionByHash".into(), [hash])
            .await?;
        let raw = raw
            .filter(|raw| !raw.is_empty())
            .map(RawTransaction::from)
            .ok_or_else(|| anyhow!("no transaction with hash {hash}"))?;

        self.raw_transaction_by_hash_cache.put(hash, raw.clone());
        Ok(raw)
    }

    async fn messenger_nonce(&mut self) -> Result<U256> {
        let data = messageNonceCall {}.abi_encode();
        let ret = eth_call(&self.inner, L1_MESSENGER_ADDRESS, data.into()).await?;
        let nonce = messageNonceCall::abi_decode_returns(&ret, true)?._0;
        trace!(target: "providers", %nonce, "Fetched messenger nonce");
        Ok(nonce)
    }
}

/// The [AlloyTargetChainProvider] is a concrete implementation of the
/// [TargetChainProvider] trait, providing target chain data over Ethereum
/// JSON-RPC using an alloy provider as the backend.
///
/// Only data immutable once produced is cached. The head block and account
/// state are fetched fresh on every call.
#[derive(Debug, Clone)]
pub struct AlloyTargetChainProvider {
    /// The inner Ethereum JSON-RPC provider.
    inner: ReqwestProvider,
    /// `block_by_number` LRU cache.
    block_by_number_cache: LruCache<u64, ChainBlock>,
}

impl AlloyTargetChainProvider {
    /// Creates a new [AlloyTargetChainProvider] with the given alloy provider.
    pub fn new(inner: ReqwestProvider) -> Self {
        Self {
            inner,
            block_by_number_cache: LruCache::new(NonZeroUsize::new(CACHE_SIZE).unwrap()),
        }
    }

    /// Creates a new [AlloyTargetChainProvider] from the provided [reqwest::Url].
    pub fn new_http(url: reqwest::Url) -> Self {
        Self::new(ReqwestProvider::new_http(url))
    }

    /// Returns the chain ID.
    pub async fn chain_id(&mut self) -> Result<u64> {
        Ok(self.inner.get_chain_id().await?)
    }
}

#[async_trait]
impl TargetChainProvider for AlloyTargetChainProvider {
    async fn head_block(&mut self) -> Result<ChainBlock> {
        let block: Option<ChainBlock> = self
            .inner
            .raw_request("eth_getBlockByNumber".into(), ("latest", false))
            .await?;
        block.ok_or_else(|| anyhow!("target chain has no latest block"))
    }

    async fn block_by_number(&mut self, number: u64) -> Result<Option<ChainBlock>> {
        if let Some(block) = self.block_by_number_cache.get(&number) {
            return Ok(Some(block.clone()));
        }

        let block = block_by_number(&self.inner, number).await?;
        if let Some(block) = &block {
            self.block_by_number_cache.put(number, block.clone());
        }
        Ok(block)
    }

    async fn balance(&mut self, address: Address) -> Result<U256> {
        Ok(self.inner.get_balance(address).await?)
    }

    async fn token_balance(&mut self, address: Address) -> Result<U256> {
        let data = balanceOfCall { account: address }.abi_encode();
        let ret = eth_call(&self.inner, L2_TOKEN_ADDRESS, data.into()).await?;
        Ok(balanceOfCall::abi_decode_returns(&ret, true)?._0)
    }

    async fn transaction_count(&mut self, address: Address) -> Result<u64> {
        Ok(self.inner.get_transaction_count(address).await?)
    }

    async fn gas_price(&mut self) -> Result<u128> {
        Ok(self.inner.get_gas_price().await?)
    }

    async fn send_raw_transaction(&mut self, tx: &RawTransaction) -> Result<B256> {
        let pending = self.inner.send_raw_transaction(tx.as_ref()).await?;
        let hash = *pending.tx_hash();
        debug!(target: "providers", %hash, "Submitted raw transaction");
        Ok(hash)
    }
}
