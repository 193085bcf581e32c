//! Bridge and predeploy addresses shared by the deposit builders.

use alloy_primitives::{address, Address, U256};

/// The address of the legacy chain's L1 standard bridge.
pub const L1_STANDARD_BRIDGE_ADDRESS: Address =
    address!("6900000000000000000000000000000000000003");

/// The address of the L2 standard bridge predeploy.
pub const L2_STANDARD_BRIDGE_ADDRESS: Address =
    address!("4200000000000000000000000000000000000010");

/// The address of the L1 cross domain messenger.
pub const L1_MESSENGER_ADDRESS: Address = address!("6900000000000000000000000000000000000002");

/// The address of the L2 cross domain messenger predeploy.
pub const L2_MESSENGER_ADDRESS: Address = address!("4200000000000000000000000000000000000007");

/// The address of the governance token on L1.
pub const L1_TOKEN_ADDRESS: Address = address!("154C5E3762FbB57427d6B03E7302BDA04C497226");

/// The address of the governance token predeploy on L2.
pub const L2_TOKEN_ADDRESS: Address = address!("42000000000000000000000000000000000000fe");

/// The address of the sequencer fee vault predeploy, the default fee
/// recipient for replayed blocks.
pub const SEQUENCER_FEE_VAULT_ADDRESS: Address =
    address!("4200000000000000000000000000000000000011");

/// The offset added to an L1 contract address to derive the sender it
/// appears as on L2.
pub const L1_TO_L2_ALIAS_OFFSET: Address = address!("1111000000000000000000000000000000001111");

/// Applies the L1 to L2 address alias, wrapping modulo 2^160.
pub fn apply_l1_to_l2_alias(address: Address) -> Address {
    let aliased = U256::from_be_slice(address.as_slice())
        .wrapping_add(U256::from_be_slice(L1_TO_L2_ALIAS_OFFSET.as_slice()));
    Address::from_slice(&aliased.to_be_bytes::<32>()[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_of_zero_is_offset() {
        assert_eq!(apply_l1_to_l2_alias(Address::ZERO), L1_TO_L2_ALIAS_OFFSET);
    }

    #[test]
    fn test_alias_wraps_modulo_address_space() {
        let max = address!("ffffffffffffffffffffffffffffffffffffffff");
        assert_eq!(
            apply_l1_to_l2_alias(max),
            address!("1111000000000000000000000000000000001110")
        );
    }

    #[test]
    fn test_alias_of_l1_messenger() {
        let aliased = apply_l1_to_l2_alias(L1_MESSENGER_ADDRESS);
        assert_eq!(aliased, address!("7a11000000000000000000000000000000001113"));
    }
}
