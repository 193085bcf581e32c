//! Cross domain message encoding for bridged token deposits.
//!
//! A token mint reaches L2 as calldata on the cross domain messenger: an
//! outer `relayMessage` envelope from the L1 bridge, wrapping a
//! `finalizeBridgeERC20` call on the L2 bridge.

use crate::{
    L1_STANDARD_BRIDGE_ADDRESS, L1_TOKEN_ADDRESS, L2_STANDARD_BRIDGE_ADDRESS, L2_TOKEN_ADDRESS,
};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};

sol! {
    /// @notice Current message nonce of the cross domain messenger.
    function messageNonce() external view returns (uint256);

    /// @notice Completes an ERC20 bridge transfer on the local chain.
    function finalizeBridgeERC20(
        address _localToken,
        address _remoteToken,
        address _from,
        address _to,
        uint256 _amount,
        bytes calldata _extraData
    ) external;

    /// @notice Relays a message sent on the remote chain.
    function relayMessage(
        uint256 _nonce,
        address _sender,
        address _target,
        uint256 _value,
        uint256 _minGasLimit,
        bytes calldata _message
    ) external payable;

    /// @notice Standard ERC20 balance query.
    function balanceOf(address account) external view returns (uint256);
}

/// The minimum gas forwarded with a relayed bridge message.
pub const RELAY_MESSAGE_GAS_LIMIT: u64 = 1_000_000;

/// Builds the calldata that mints bridged tokens to `recipient` through the
/// L2 cross domain messenger.
///
/// The inner frame finalizes an ERC20 transfer of `amount` on the L2
/// standard bridge. The outer frame is the messenger `relayMessage`
/// envelope, carrying the inner frame from the L1 bridge under `nonce`.
pub fn bridge_relay_calldata(recipient: Address, amount: U256, nonce: U256) -> Bytes {
    let finalize = finalizeBridgeERC20Call {
        _localToken: L2_TOKEN_ADDRESS,
        _remoteToken: L1_TOKEN_ADDRESS,
        _from: recipient,
        _to: recipient,
        _amount: amount,
        _extraData: Bytes::new(),
    }
    .abi_encode();

    relayMessageCall {
        _nonce: nonce,
        _sender: L1_STANDARD_BRIDGE_ADDRESS,
        _target: L2_STANDARD_BRIDGE_ADDRESS,
        _value: U256::ZERO,
        _minGasLimit: U256::from(RELAY_MESSAGE_GAS_LIMIT),
        _message: finalize.into(),
    }
    .abi_encode()
    .into()
}
