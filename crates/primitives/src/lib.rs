#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/op-rs/hilo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod block;
pub use block::ChainBlock;

mod raw_tx;
pub use raw_tx::RawTransaction;

mod codec;
pub use codec::{CodecError, ReplayTransaction};

mod deposits;
pub use deposits::{
    encode_versioned_nonce, DepositNonces, EthDeposit, TokenDeposit, UserDepositSource,
    DEPOSIT_GAS_LIMIT, USER_DEPOSIT_SOURCE_DOMAIN,
};

mod message;
pub use message::{
    bridge_relay_calldata, balanceOfCall, finalizeBridgeERC20Call, messageNonceCall,
    relayMessageCall, RELAY_MESSAGE_GAS_LIMIT,
};

mod addresses;
pub use addresses::{
    apply_l1_to_l2_alias, L1_MESSENGER_ADDRESS, L1_STANDARD_BRIDGE_ADDRESS, L1_TOKEN_ADDRESS,
    L1_TO_L2_ALIAS_OFFSET, L2_MESSENGER_ADDRESS, L2_STANDARD_BRIDGE_ADDRESS, L2_TOKEN_ADDRESS,
    SEQUENCER_FEE_VAULT_ADDRESS,
};
