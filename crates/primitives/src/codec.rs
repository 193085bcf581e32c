//! The replay transaction codec.

use crate::RawTransaction;
use alloy_consensus::TxEnvelope;
use alloy_eips::eip2718::{Decodable2718, Eip2718Error, Encodable2718};
use alloy_primitives::{keccak256, Bytes, B256};
use op_alloy_consensus::{OpTxEnvelope, OpTxType, TxDeposit};
use thiserror::Error;

/// An error thrown by [ReplayTransaction] codec operations.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The encoded transaction carried no bytes.
    #[error("empty transaction bytes")]
    EmptyBytes,
    /// The leading type tag names a transaction kind the codec does not
    /// carry.
    #[error("unsupported transaction kind: {0}")]
    UnsupportedTransactionKind(u8),
    /// The envelope bytes failed to decode.
    #[error("failed to decode transaction: {0}")]
    Decode(Eip2718Error),
}

/// A transaction prepared for replay, tagged by kind.
///
/// The target node accepts one binary envelope format, but replayed blocks
/// mix three origins: signed transactions, synthesized deposits, and raw
/// bytes lifted from the legacy chain. Raw legacy bytes are never
/// re-encoded, so their hashes survive replay untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayTransaction {
    /// A standard signed transaction envelope.
    Signed(TxEnvelope),
    /// A synthetic deposit transaction.
    Deposit(TxDeposit),
    /// A legacy chain transaction carried as raw bytes.
    Legacy(RawTransaction),
}

impl ReplayTransaction {
    /// The canonical envelope bytes submitted to the target node.
    pub fn encoded(&self) -> Bytes {
        match self {
            Self::Signed(envelope) => envelope.encoded_2718().into(),
            Self::Deposit(deposit) => {
                let envelope = OpTxEnvelope::Deposit(deposit.clone());
                let mut buffer = Vec::with_capacity(envelope.encode_2718_len());
                envelope.encode_2718(&mut buffer);
                buffer.into()
            }
            Self::Legacy(raw) => raw.0.clone(),
        }
    }

    /// The canonical hash of the transaction.
    pub fn tx_hash(&self) -> B256 {
        match self {
            Self::Signed(envelope) => *envelope.tx_hash(),
            Self::Deposit(_) => keccak256(self.encoded()),
            Self::Legacy(raw) => raw.tx_hash(),
        }
    }

    /// The kind of the transaction, for reporting.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Signed(_) => "signed",
            Self::Deposit(_) => "deposit",
            Self::Legacy(_) => "legacy",
        }
    }

    /// Decodes envelope bytes into a tagged transaction.
    ///
    /// Bytes tagged as deposits or recognized signed envelopes decode into
    /// their structured kinds. Unrecognized type tags are rejected rather
    /// than carried opaquely, so a malformed payload cannot round-trip
    /// silently.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let tag = *data.first().ok_or(CodecError::EmptyBytes)?;
        if tag == OpTxType::Deposit as u8 {
            return match OpTxEnvelope::decode_2718(&mut &data[..]) {
                Ok(OpTxEnvelope::Deposit(deposit)) => Ok(Self::Deposit(deposit)),
                Ok(_) => Err(CodecError::UnsupportedTransactionKind(tag)),
                Err(err) => Err(CodecError::Decode(err)),
            };
        }
        match TxEnvelope::decode_2718(&mut &data[..]) {
            Ok(envelope) => Ok(Self::Signed(envelope)),
            Err(Eip2718Error::UnexpectedType(kind)) => {
                Err(CodecError::UnsupportedTransactionKind(kind))
            }
            Err(err) => Err(CodecError::Decode(err)),
        }
    }
}

impl From<TxEnvelope> for ReplayTransaction {
    fn from(envelope: TxEnvelope) -> Self {
        Self::Signed(envelope)
    }
}

impl From<TxDeposit> for ReplayTransaction {
    fn from(deposit: TxDeposit) -> Self {
        Self::Deposit(deposit)
    }
}

impl From<RawTransaction> for ReplayTransaction {
    fn from(raw: RawTransaction) -> Self {
        Self::Legacy(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EthDeposit, TokenDeposit, UserDepositSource};
    use alloy_consensus::{SignableTransaction, TxLegacy};
    use alloy_primitives::{address, Signature, TxKind, U256};
    use proptest::{collection::vec, option, prelude::any, proptest};

    fn signed_legacy(nonce: u64, chain_id: Option<u64>, input: Vec<u8>) -> TxEnvelope {
        let tx = TxLegacy {
            chain_id,
            nonce,
            gas_price: 1_000_000_000,
            gas_limit: 5_000_000,
            to: TxKind::Call(address!("00000000000000000000000000000000deadbeef")),
            value: U256::from(10u64),
            input: input.into(),
        };
        let sig = Signature::test_signature();
        TxEnvelope::Legacy(tx.into_signed(sig))
    }

    #[test]
    fn test_signed_round_trip() {
        let envelope = signed_legacy(1, Some(901), vec![1, 2, 3]);
        let expected_hash = *envelope.tx_hash();

        let tx = ReplayTransaction::Signed(envelope);
        let encoded = tx.encoded();
        let decoded = ReplayTransaction::decode(&encoded).unwrap();

        assert_eq!(decoded, tx);
        assert_eq!(decoded.tx_hash(), expected_hash);
        assert_eq!(decoded.encoded(), encoded);
    }

    #[test]
    fn test_deposit_round_trip() {
        let deposit = TokenDeposit {
            recipient: address!("a83114a443da1cecefc50368531cace9f37fcccb"),
            amount: U256::from(77u64),
            nonce: U256::from(3u64),
        }
        .into_deposit(UserDepositSource::new(UserDepositSource::mock_origin_hash(4), 2));

        let tx = ReplayTransaction::Deposit(deposit.clone());
        let encoded = tx.encoded();
        assert_eq!(encoded[0], OpTxType::Deposit as u8);

        match ReplayTransaction::decode(&encoded).unwrap() {
            ReplayTransaction::Deposit(decoded) => assert_eq!(decoded, deposit),
            other => panic!("decoded into wrong kind: {}", other.kind()),
        }
    }

    #[test]
    fn test_eth_deposit_encodes_as_deposit() {
        let from = address!("de3829a23df1479438622a08a116e8eb3f620bb5");
        let deposit =
            EthDeposit { from, to: from, amount: 500 }.into_deposit(UserDepositSource::random());
        let encoded = ReplayTransaction::Deposit(deposit).encoded();
        assert_eq!(encoded[0], OpTxType::Deposit as u8);
    }

    #[test]
    fn test_legacy_passthrough_is_bit_exact() {
        let envelope = signed_legacy(7, Some(901), vec![0xde, 0xad]);
        let raw_bytes = envelope.encoded_2718();
        let expected_hash = *envelope.tx_hash();

        let tx = ReplayTransaction::Legacy(RawTransaction::from(raw_bytes.clone()));
        assert_eq!(tx.encoded().to_vec(), raw_bytes);
        assert_eq!(tx.tx_hash(), expected_hash);
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let err = ReplayTransaction::decode(&[0x55, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedTransactionKind(0x55)));
    }

    #[test]
    fn test_decode_rejects_empty_bytes() {
        let err = ReplayTransaction::decode(&[]).unwrap_err();
        assert!(matches!(err, CodecError::EmptyBytes));
    }

    #[test]
    fn test_decode_rejects_truncated_deposit() {
        let err = ReplayTransaction::decode(&[OpTxType::Deposit as u8]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    proptest! {
        #[test]
        fn test_signed_round_trip_arbitrary_legacy(
            nonce in any::<u64>(),
            chain_id in option::of(0u64..1_000_000),
            input in vec(any::<u8>(), 0..64),
        ) {
            let envelope = signed_legacy(nonce, chain_id, input);
            let expected_hash = *envelope.tx_hash();

            let tx = ReplayTransaction::Signed(envelope);
            let decoded = ReplayTransaction::decode(&tx.encoded()).unwrap();
            assert_eq!(decoded, tx);
            assert_eq!(decoded.tx_hash(), expected_hash);
        }
    }
}
