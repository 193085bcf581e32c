//! Demo deposits sealed through the block production path.
//!
//! Mirrors a full user flow on a local development setup: one transfer
//! enters the target's transaction pool over public RPC, a native mint
//! and a bridged token mint are synthesized as deposits, and a second
//! transfer rides directly in the payload attributes. All of them land
//! in a single sealed block, and the balances are checked afterwards.

use crate::cli::DepositArgs;
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{address, Address, Bytes, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{anyhow, Result};
use hilo_engine::{EngineClient, EngineDriver, ForkchoiceState, PayloadAttributes};
use hilo_primitives::{
    ChainBlock, DepositNonces, EthDeposit, RawTransaction, ReplayTransaction, TokenDeposit,
    UserDepositSource,
};
use hilo_providers::{
    AlloyLegacyChainProvider, AlloyTargetChainProvider, LegacyChainProvider, TargetChainProvider,
};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

/// Gas limit of the sealed demo block.
const DEMO_GAS_LIMIT: u64 = 15_000_000;

/// Gas limit of each demo transfer.
const TRANSFER_GAS_LIMIT: u64 = 5_000_000;

/// Sink account the demo transfers send to.
const TRANSFER_RECIPIENT: Address = address!("00000000000000000000000000000000deadbeef");

/// Attempts to observe the sealed block over public RPC, one second apart.
const SEAL_POLL_ATTEMPTS: usize = 10;

/// Seals one block of demo deposits and verifies the credited balances.
pub(crate) async fn demo(args: &DepositArgs) -> Result<()> {
    let mut legacy = AlloyLegacyChainProvider::new_http(args.replay.legacy_endpoint.clone());
    let mut target = AlloyTargetChainProvider::new_http(args.replay.target_endpoint.clone());
    let engine = EngineClient::new(
        args.replay.engine_endpoint.clone(),
        crate::cli::read_jwt_secret(&args.replay.jwt_secret)?,
    );
    let mut driver =
        EngineDriver::with_timeout(engine, Duration::from_secs(args.replay.call_timeout));

    let chain_id = target.chain_id().await?;
    let pool_signer = PrivateKeySigner::from_str(args.pool_key.trim())?;
    let attributes_signer = PrivateKeySigner::from_str(args.attributes_key.trim())?;
    let deposit_address = PrivateKeySigner::from_str(args.deposit_key.trim())?.address();

    // One transfer goes through the pool so block production picks it up
    // alongside the attribute transactions.
    let pool_tx = signed_transfer(&mut target, &pool_signer, chain_id).await?;
    let pool_hash =
        target.send_raw_transaction(&RawTransaction::from(pool_tx.encoded_2718())).await?;
    info!(target: "hilo", hash = %pool_hash, "Pool transaction submitted");

    let eth_deposit =
        EthDeposit { from: deposit_address, to: deposit_address, amount: args.mint_eth }
            .into_deposit(UserDepositSource::random());
    let mut nonces = DepositNonces::with_seed(legacy.messenger_nonce().await?);
    let token_deposit = TokenDeposit {
        recipient: deposit_address,
        amount: U256::from(args.mint_token),
        nonce: nonces.next(deposit_address),
    }
    .into_deposit(UserDepositSource::random());
    let attributes_tx = signed_transfer(&mut target, &attributes_signer, chain_id).await?;

    let pre_eth = target.balance(deposit_address).await?;
    let pre_token = target.token_balance(deposit_address).await?;
    info!(target: "hilo", native = %pre_eth, token = %pre_token, "Balances before the deposit");

    let head = target.head_block().await?;
    let attributes = PayloadAttributes {
        timestamp: head.timestamp + 1000,
        prev_randao: B256::ZERO,
        suggested_fee_recipient: args.replay.fee_recipient,
        transactions: vec![
            ReplayTransaction::from(eth_deposit).encoded(),
            ReplayTransaction::from(token_deposit).encoded(),
            ReplayTransaction::from(attributes_tx).encoded(),
        ],
        no_tx_pool: false,
        gas_limit: Some(DEMO_GAS_LIMIT),
    };
    let forkchoice = ForkchoiceState {
        head_block_hash: head.hash,
        safe_block_hash: head.hash,
        finalized_block_hash: head.hash,
    };

    let payload_id = driver.propose(forkchoice, attributes).await?;
    let payload = driver.fetch(payload_id).await?;
    info!(
        target: "hilo",
        number = payload.block_number,
        transactions = payload.transactions.len(),
        "Built demo payload"
    );
    if let Some(first) = payload.transactions.first() {
        let decoded = ReplayTransaction::decode(first)?;
        debug!(target: "hilo", kind = decoded.kind(), hash = %decoded.tx_hash(), "Leading payload transaction");
    }
    driver.commit(&payload).await?;
    driver.advance_head(payload.block_hash).await?;

    let sealed = wait_for_block(&mut target, head.number + 1).await?;
    if !sealed.is_child_of(&head) {
        return Err(anyhow!("sealed block {} does not extend head {}", sealed.hash, head.hash));
    }
    if sealed.hash != payload.block_hash {
        return Err(anyhow!(
            "sealed block hash {} does not match payload hash {}",
            sealed.hash,
            payload.block_hash
        ));
    }
    if sealed.transactions.len() != payload.transactions.len() {
        return Err(anyhow!(
            "sealed block carries {} transactions, payload had {}",
            sealed.transactions.len(),
            payload.transactions.len()
        ));
    }

    let post_eth = target.balance(deposit_address).await?;
    let post_token = target.token_balance(deposit_address).await?;
    info!(target: "hilo", native = %post_eth, token = %post_token, "Balances after the deposit");
    if post_eth != pre_eth + U256::from(args.mint_eth) {
        return Err(anyhow!("native mint not credited: {} -> {}", pre_eth, post_eth));
    }
    if post_token != pre_token + U256::from(args.mint_token) {
        return Err(anyhow!("token mint not credited: {} -> {}", pre_token, post_token));
    }

    info!(
        target: "hilo",
        number = sealed.number,
        hash = %sealed.hash,
        transactions = sealed.transactions.len(),
        "Demo block sealed and verified"
    );
    Ok(())
}

/// Builds and signs a zero value transfer from `signer` to the demo sink.
async fn signed_transfer(
    target: &mut AlloyTargetChainProvider,
    signer: &PrivateKeySigner,
    chain_id: u64,
) -> Result<TxEnvelope> {
    let nonce = target.transaction_count(signer.address()).await?;
    let gas_price = target.gas_price().await?;
    let tx = TxLegacy {
        chain_id: Some(chain_id),
        nonce,
        gas_price,
        gas_limit: TRANSFER_GAS_LIMIT,
        to: TxKind::Call(TRANSFER_RECIPIENT),
        value: U256::ZERO,
        input: Bytes::new(),
    };
    let signature = signer.sign_hash_sync(&tx.signature_hash())?;
    Ok(TxEnvelope::Legacy(tx.into_signed(signature)))
}

/// Polls the target chain until the block at `number` is visible.
async fn wait_for_block(
    target: &mut AlloyTargetChainProvider,
    number: u64,
) -> Result<ChainBlock> {
    for _ in 0..SEAL_POLL_ATTEMPTS {
        if let Some(block) = target.block_by_number(number).await? {
            return Ok(block);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Err(anyhow!("block {} did not appear on the target chain", number))
}
