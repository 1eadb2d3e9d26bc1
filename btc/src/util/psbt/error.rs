use crate::bitcoin::{Hash, Hash160, Ripemd160Hash, Sha256Hash, Tx, TxHash};
use crate::util::psbt::raw;
use std::fmt;

/// A hash that a preimage in an input map is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PsbtHash {
    Ripemd160(Ripemd160Hash),
    Sha256(Sha256Hash),
    Hash256(Hash),
    Hash160(Hash160),
}

/// Ways that a Partially Signed Transaction might fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Magic bytes for a PSBT must be the ASCII for "psbt" serialized in most
    /// significant byte order.
    InvalidMagic,
    /// The separator for a PSBT must be `0xff`.
    InvalidSeparator,
    /// Known keys must be according to BIP174.
    InvalidKey(raw::Key),
    /// Non-proprietary key type found when proprietary key was expected
    InvalidProprietaryKey,
    /// Keys within key-value map should never be duplicated.
    DuplicateKey(raw::Key),
    /// The scriptSigs for the unsigned transaction must be empty.
    UnsignedTxHasScriptSigs,
    /// The scriptWitnesses for the unsigned transaction must be empty.
    UnsignedTxHasScriptWitnesses,
    /// A PSBT must have an unsigned transaction.
    MustHaveUnsignedTx,
    /// Attempting to merge with a PSBT describing a different unsigned
    /// transaction.
    UnexpectedUnsignedTx {
        /// Expected
        expected: Box<Tx>,
        /// Actual
        actual: Box<Tx>,
    },
    /// Merging maps for a different number of inputs.
    InputCountMismatch {
        expected: usize,
        actual: usize,
    },
    /// Merging maps for a different number of outputs.
    OutputCountMismatch {
        expected: usize,
        actual: usize,
    },
    /// Unable to parse as a standard SigHash type.
    NonStandardSigHashType(u32),
    /// The pre-image must hash to the corresponding psbt hash
    InvalidPreimageHashPair {
        /// Pre-image
        preimage: Vec<u8>,
        /// Hash value
        hash: PsbtHash,
    },
    /// If NonWitnessUtxo is used, the nonWitnessUtxo txid must
    /// be the same as the prevout txid
    InvalidNonWitnessUtxo {
        prevout_txid: TxHash,
        non_witness_utxo_txid: TxHash,
    },
    /// Incorrect P2sh/p2wsh script hash for the witness/redeem
    /// script
    InvalidWitnessScript {
        /// Expected Witness/Redeem Script Hash
        // a vec to unify the p2wsh(sha256) and p2sh(hash160) lengths
        expected: Vec<u8>,
        /// Actual Witness script Hash
        actual: Vec<u8>,
    },
    /// Currently only p2wpkh and p2wsh scripts are possible in segwit
    UnrecognizedWitnessProgram,
    /// The psbt input must either have an associated nonWitnessUtxo or
    /// a WitnessUtxo
    MustHaveSpendingUtxo,
    /// A value did not decode as the type its key requires, or had bytes left over.
    InvalidValue(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidKey(rkey) => write!(f, "invalid key: {}", rkey),
            Error::InvalidProprietaryKey => f.write_str(
                "non-proprietary key type found when proprietary key was expected",
            ),
            Error::DuplicateKey(rkey) => write!(f, "duplicate key: {}", rkey),
            Error::UnexpectedUnsignedTx { expected, actual } => write!(
                f,
                "different unsigned transaction: expected {}, actual {}",
                expected.txid(),
                actual.txid()
            ),
            Error::InputCountMismatch { expected, actual } => write!(
                f,
                "different number of inputs: expected {}, actual {}",
                expected, actual
            ),
            Error::OutputCountMismatch { expected, actual } => write!(
                f,
                "different number of outputs: expected {}, actual {}",
                expected, actual
            ),
            Error::NonStandardSigHashType(sht) => write!(f, "non-standard sighash type: {}", sht),
            Error::InvalidMagic => f.write_str("invalid magic"),
            Error::InvalidSeparator => f.write_str("invalid separator"),
            Error::UnsignedTxHasScriptSigs => {
                f.write_str("the unsigned transaction has script sigs")
            }
            Error::UnsignedTxHasScriptWitnesses => {
                f.write_str("the unsigned transaction has script witnesses")
            }
            Error::MustHaveUnsignedTx => {
                f.write_str("partially signed transactions must have an unsigned transaction")
            }
            Error::InvalidPreimageHashPair { preimage, hash } => write!(
                f,
                "preimage {} does not match hash {:?}",
                hex::encode(preimage),
                hash
            ),
            Error::InvalidNonWitnessUtxo {
                prevout_txid,
                non_witness_utxo_txid,
            } => write!(
                f,
                "non-witness utxo txid {} must be the same as prevout txid {}",
                non_witness_utxo_txid, prevout_txid
            ),
            Error::InvalidWitnessScript { expected, actual } => write!(
                f,
                "invalid witness/redeem script: expected hash {}, got {}",
                hex::encode(expected),
                hex::encode(actual)
            ),
            Error::UnrecognizedWitnessProgram => {
                f.write_str("witness program must be p2wpkh/p2wsh")
            }
            Error::MustHaveSpendingUtxo => {
                f.write_str("input must have either a witness utxo or a non-witness utxo")
            }
            Error::InvalidValue(s) => write!(f, "invalid value: {}", s),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let key = raw::Key {
            type_value: 0x02,
            key: vec![0xab, 0xcd],
        };
        assert_eq!(
            Error::DuplicateKey(key).to_string(),
            "duplicate key: type: 0x02, key: abcd"
        );
        assert_eq!(
            Error::NonStandardSigHashType(0x84).to_string(),
            "non-standard sighash type: 132"
        );
        let e = Error::InvalidPreimageHashPair {
            preimage: vec![1, 2],
            hash: PsbtHash::Hash160(Hash160::ZERO),
        };
        assert!(e.to_string().starts_with("preimage 0102 does not match hash Hash160("));
    }
}
