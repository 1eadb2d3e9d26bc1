//! Partially signed transactions (BIP174).
//!
//! A PSBT carries an unsigned transaction together with everything a signer needs to know about
//! each input and output. It is passed between wallets, each one adding what it knows, until it
//! can be finalized and extracted as a network transaction.
//!
//! The binary form is the magic `psbt`, a `0xff` separator, the global map and then one map per
//! input and per output of the unsigned transaction. The text form is base64.

use crate::bitcoin::{Encodable, FromHex, Hash160, Sha256Hash, ToHex, Tx, TxOutput};
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{Buf, BufMut};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

mod error;
pub mod map;
pub mod raw;
pub mod serialize;

pub use self::error::{Error, PsbtHash};
pub use self::map::{Global, Input, Map, Output};

/// The first bytes of every PSBT.
pub const PSBT_MAGIC: [u8; 4] = *b"psbt";
/// The byte following the magic.
pub const PSBT_SEPARATOR: u8 = 0xff;

/// A Partially Signed Transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartiallySignedTransaction {
    /// The key-value pairs for all global data.
    pub global: Global,
    /// The corresponding key-value map for each input in the unsigned transaction.
    pub inputs: Vec<Input>,
    /// The corresponding key-value map for each output in the unsigned transaction.
    pub outputs: Vec<Output>,
}

/// Short name for [PartiallySignedTransaction].
pub type Psbt = PartiallySignedTransaction;

impl PartiallySignedTransaction {
    /// Create a PSBT with empty maps for each input and output of the transaction.
    ///
    /// Fails if any input already has a scriptSig or a witness.
    pub fn from_unsigned_tx(tx: Tx) -> Result<Psbt> {
        let inputs = vec![Input::default(); tx.inputs.len()];
        let outputs = vec![Output::default(); tx.outputs.len()];
        Ok(Psbt {
            global: Global::from_unsigned_tx(tx)?,
            inputs,
            outputs,
        })
    }

    pub fn unsigned_tx(&self) -> &Tx {
        &self.global.unsigned_tx
    }

    /// The binary form of the PSBT.
    pub fn serialize(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.encoded_size() as usize);
        // writing to a vec does not fail
        let _ = self.to_binary(&mut v);
        v
    }

    /// Read a PSBT from its binary form. Every byte must belong to the PSBT.
    pub fn deserialize(bytes: &[u8]) -> Result<Psbt> {
        let mut slice = bytes;
        let psbt = Psbt::from_binary(&mut slice)?;
        if slice.has_remaining() {
            return Err(crate::Error::BadData(format!(
                "{} bytes after end of psbt",
                slice.remaining()
            )));
        }
        Ok(psbt)
    }

    /// Combine the data of another PSBT for the same unsigned transaction into this one.
    ///
    /// Where both carry a value for the same key the value in `self` is kept.
    pub fn merge(&mut self, other: Psbt) -> Result<()> {
        self.global.merge(other.global)?;
        // only reachable when a map list was edited out of step with the transaction
        if self.inputs.len() != other.inputs.len() {
            return Err(Error::InputCountMismatch {
                expected: self.inputs.len(),
                actual: other.inputs.len(),
            }
            .into());
        }
        if self.outputs.len() != other.outputs.len() {
            return Err(Error::OutputCountMismatch {
                expected: self.outputs.len(),
                actual: other.outputs.len(),
            }
            .into());
        }
        for (ours, theirs) in self.inputs.iter_mut().zip(other.inputs) {
            ours.merge(theirs)?;
        }
        for (ours, theirs) in self.outputs.iter_mut().zip(other.outputs) {
            ours.merge(theirs)?;
        }
        Ok(())
    }

    /// The network transaction, with each input's final scriptSig and witness filled in.
    ///
    /// Inputs that have not been finalized are left with an empty scriptSig and witness.
    pub fn extract_tx(self) -> Tx {
        let mut tx = self.global.unsigned_tx;
        for (txin, input) in tx.inputs.iter_mut().zip(self.inputs) {
            txin.script_sig = input.final_script_sig.unwrap_or_default();
            txin.witness = input.final_script_witness.unwrap_or_default();
        }
        tx
    }

    /// The output spent by the input at `index`, taken from the witness utxo if present and
    /// otherwise from the non-witness utxo.
    pub fn spending_utxo(&self, index: usize) -> Result<&TxOutput> {
        let input = self.input(index)?;
        if let Some(ref utxo) = input.witness_utxo {
            return Ok(utxo);
        }
        if let Some(ref prev_tx) = input.non_witness_utxo {
            let outpoint = &self.global.unsigned_tx.inputs[index].outpoint;
            check_prev_tx(prev_tx, &outpoint.txid)?;
            return prev_tx.outputs.get(outpoint.vout as usize).ok_or_else(|| {
                crate::Error::BadData(format!(
                    "non-witness utxo has no output {}",
                    outpoint.vout
                ))
            });
        }
        Err(Error::MustHaveSpendingUtxo.into())
    }

    /// Check that the data of the input at `index` is consistent with the output it spends.
    ///
    /// The non-witness utxo must be the transaction named by the prevout, and a redeem script or
    /// witness script must hash to the program of the spent output.
    pub fn check_input(&self, index: usize) -> Result<()> {
        let input = self.input(index)?;
        if let Some(ref prev_tx) = input.non_witness_utxo {
            check_prev_tx(prev_tx, &self.global.unsigned_tx.inputs[index].outpoint.txid)?;
        }
        let mut script_pubkey = &self.spending_utxo(index)?.script_pubkey;

        if script_pubkey.is_p2sh() {
            let redeem_script = match input.redeem_script {
                Some(ref s) => s,
                None => return Ok(()),
            };
            let actual = Hash160::generate(redeem_script.as_bytes());
            let expected = &script_pubkey.as_bytes()[2..22];
            if actual.hash[..] != *expected {
                return Err(Error::InvalidWitnessScript {
                    expected: expected.to_vec(),
                    actual: actual.hash.to_vec(),
                }
                .into());
            }
            script_pubkey = redeem_script;
        }

        if script_pubkey.is_witness_program() {
            if script_pubkey.is_v0_p2wsh() {
                if let Some(ref witness_script) = input.witness_script {
                    let actual = Sha256Hash::generate(witness_script.as_bytes());
                    let expected = &script_pubkey.as_bytes()[2..];
                    if actual.hash[..] != *expected {
                        return Err(Error::InvalidWitnessScript {
                            expected: expected.to_vec(),
                            actual: actual.hash.to_vec(),
                        }
                        .into());
                    }
                }
            } else if !script_pubkey.is_v0_p2wpkh() {
                return Err(Error::UnrecognizedWitnessProgram.into());
            }
        }
        Ok(())
    }

    fn input(&self, index: usize) -> Result<&Input> {
        if index >= self.global.unsigned_tx.inputs.len() {
            return Err(crate::Error::BadArgument(format!(
                "input index {} out of range, transaction has {} inputs",
                index,
                self.global.unsigned_tx.inputs.len()
            )));
        }
        self.inputs.get(index).ok_or_else(|| {
            crate::Error::BadArgument(format!("no input map for input {}", index))
        })
    }
}

fn check_prev_tx(prev_tx: &Tx, prevout_txid: &crate::bitcoin::TxHash) -> Result<()> {
    let txid = prev_tx.txid();
    if txid != *prevout_txid {
        return Err(Error::InvalidNonWitnessUtxo {
            prevout_txid: *prevout_txid,
            non_witness_utxo_txid: txid,
        }
        .into());
    }
    Ok(())
}

impl Encodable for PartiallySignedTransaction {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self>
    where
        Self: Sized,
    {
        if buffer.remaining() < PSBT_MAGIC.len() {
            return Err(Error::InvalidMagic.into());
        }
        let mut magic = [0u8; 4];
        buffer.copy_to_slice(&mut magic);
        if magic != PSBT_MAGIC {
            return Err(Error::InvalidMagic.into());
        }
        if buffer.try_get_u8()? != PSBT_SEPARATOR {
            return Err(Error::InvalidSeparator.into());
        }

        let global = Global::decode(buffer)?;
        let mut inputs = Vec::with_capacity(global.unsigned_tx.inputs.len());
        for txin in global.unsigned_tx.inputs.iter() {
            let input: Input = map::decode_map(buffer)?;
            if let Some(ref prev_tx) = input.non_witness_utxo {
                let txid = prev_tx.txid();
                if txid != txin.outpoint.txid {
                    warn!(
                        "psbt input spending {} carries non-witness utxo {}",
                        txin.outpoint, txid
                    );
                }
            }
            inputs.push(input);
        }
        let mut outputs = Vec::with_capacity(global.unsigned_tx.outputs.len());
        for _ in 0..global.unsigned_tx.outputs.len() {
            outputs.push(map::decode_map(buffer)?);
        }
        Ok(Psbt {
            global,
            inputs,
            outputs,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_slice(&PSBT_MAGIC);
        buffer.put_u8(PSBT_SEPARATOR);
        self.global.encode_map(buffer)?;
        for input in self.inputs.iter() {
            input.encode_map(buffer)?;
        }
        for output in self.outputs.iter() {
            output.encode_map(buffer)?;
        }
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        let maps: u64 = self.inputs.iter().map(|i| i.encoded_map_size()).sum::<u64>()
            + self.outputs.iter().map(|o| o.encoded_map_size()).sum::<u64>();
        PSBT_MAGIC.len() as u64 + 1 + self.global.encoded_map_size() + maps
    }
}

impl fmt::Display for PartiallySignedTransaction {
    /// The base64 encoding of the binary form.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.serialize()))
    }
}

impl FromStr for PartiallySignedTransaction {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = STANDARD.decode(s.trim())?;
        Psbt::deserialize(&bytes)
    }
}

impl FromHex for PartiallySignedTransaction {
    type Error = crate::Error;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        Psbt::deserialize(&hex::decode(hex)?)
    }
}

impl ToHex for PartiallySignedTransaction {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        self.serialize().encode_hex()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        self.serialize().encode_hex_upper()
    }
}

impl Serialize for PartiallySignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PartiallySignedTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Psbt::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitcoin::{Hash, Outpoint, Script, TxInput};
    use crate::util::address::WitnessVersion;
    use hex_literal::hex;

    // magic, an unsigned tx with no inputs or outputs, end of the global map
    const EMPTY_PSBT: [u8; 19] = hex!("70736274ff01000a0200000000000000000000");

    fn prev_tx() -> Tx {
        Tx {
            version: 1,
            inputs: vec![TxInput::new(
                Outpoint::new(Hash::sha256d(b"coinbase"), 0),
                0xffffffff,
            )],
            outputs: vec![
                TxOutput::new(50_000, Script::from(vec![0x51]).to_p2sh()),
                TxOutput::new(60_000, Script::from(vec![0x52]).to_v0_p2wsh()),
            ],
            lock_time: 0,
        }
    }

    fn spend(prev: &Tx) -> Psbt {
        let txid = prev.txid();
        let tx = Tx {
            version: 2,
            inputs: vec![
                TxInput::new(Outpoint::new(txid, 0), 0xfffffffd),
                TxInput::new(Outpoint::new(txid, 1), 0xfffffffd),
            ],
            outputs: vec![TxOutput::new(100_000, Script::from(vec![0x53]))],
            lock_time: 0,
        };
        Psbt::from_unsigned_tx(tx).unwrap()
    }

    #[test]
    fn empty_psbt() {
        let psbt = Psbt::deserialize(&EMPTY_PSBT).unwrap();
        assert!(psbt.unsigned_tx().inputs.is_empty());
        assert!(psbt.inputs.is_empty());
        assert_eq!(psbt.serialize(), EMPTY_PSBT.to_vec());
        assert_eq!(psbt.encoded_size(), EMPTY_PSBT.len() as u64);
        assert_eq!(Psbt::from_str(&psbt.to_string()).unwrap(), psbt);
        assert_eq!(Psbt::from_hex(psbt.encode_hex::<String>()).unwrap(), psbt);
    }

    #[test]
    fn framing_errors() {
        assert!(matches!(
            Psbt::deserialize(&hex!("0200000001")),
            Err(crate::Error::Psbt(Error::InvalidMagic))
        ));
        assert!(matches!(
            Psbt::deserialize(&hex!("707362")),
            Err(crate::Error::Psbt(Error::InvalidMagic))
        ));
        assert!(matches!(
            Psbt::deserialize(&hex!("70736274fe")),
            Err(crate::Error::Psbt(Error::InvalidSeparator))
        ));
        let mut trailing = EMPTY_PSBT.to_vec();
        trailing.push(0);
        assert!(Psbt::deserialize(&trailing).is_err());
        // a map is missing for the single output
        let psbt = spend(&prev_tx());
        let v = psbt.serialize();
        assert!(Psbt::deserialize(&v[..v.len() - 1]).is_err());
    }

    #[test]
    fn round_trip_with_utxos() {
        let prev = prev_tx();
        let mut psbt = spend(&prev);
        psbt.inputs[0].non_witness_utxo = Some(prev.clone());
        psbt.inputs[0].redeem_script = Some(Script::from(vec![0x51]));
        psbt.inputs[1].witness_utxo = Some(prev.outputs[1].clone());
        psbt.inputs[1].witness_script = Some(Script::from(vec![0x52]));
        let decoded = Psbt::deserialize(&psbt.serialize()).unwrap();
        assert_eq!(decoded, psbt);
        assert_eq!(psbt.serialize().len() as u64, psbt.encoded_size());

        let json = serde_json::to_string(&psbt).unwrap();
        assert_eq!(json, format!("\"{}\"", psbt));
        assert_eq!(serde_json::from_str::<Psbt>(&json).unwrap(), psbt);
    }

    #[test]
    fn spending_utxo_and_checks() {
        let prev = prev_tx();
        let mut psbt = spend(&prev);
        assert!(matches!(
            psbt.spending_utxo(0),
            Err(crate::Error::Psbt(Error::MustHaveSpendingUtxo))
        ));
        assert!(psbt.spending_utxo(2).is_err());

        psbt.inputs[0].non_witness_utxo = Some(prev.clone());
        psbt.inputs[0].redeem_script = Some(Script::from(vec![0x51]));
        psbt.inputs[1].witness_utxo = Some(prev.outputs[1].clone());
        psbt.inputs[1].witness_script = Some(Script::from(vec![0x52]));
        assert_eq!(psbt.spending_utxo(0).unwrap(), &prev.outputs[0]);
        psbt.check_input(0).unwrap();
        psbt.check_input(1).unwrap();

        psbt.inputs[0].redeem_script = Some(Script::from(vec![0x00]));
        assert!(matches!(
            psbt.check_input(0),
            Err(crate::Error::Psbt(Error::InvalidWitnessScript { .. }))
        ));
        psbt.inputs[1].witness_script = Some(Script::from(vec![0x00]));
        assert!(matches!(
            psbt.check_input(1),
            Err(crate::Error::Psbt(Error::InvalidWitnessScript { .. }))
        ));

        let mut other = prev.clone();
        other.lock_time = 1;
        psbt.inputs[0].non_witness_utxo = Some(other);
        assert!(matches!(
            psbt.check_input(0),
            Err(crate::Error::Psbt(Error::InvalidNonWitnessUtxo { .. }))
        ));

        let taproot = Script::new_witness_program(WitnessVersion::V1, &[7u8; 32]);
        psbt.inputs[1].witness_utxo = Some(TxOutput::new(1, taproot));
        assert!(matches!(
            psbt.check_input(1),
            Err(crate::Error::Psbt(Error::UnrecognizedWitnessProgram))
        ));
    }

    #[test]
    fn merge_and_extract() {
        let prev = prev_tx();
        let mut a = spend(&prev);
        let mut b = a.clone();
        a.inputs[0].final_script_sig = Some(Script::from(vec![0x01, 0x51]));
        b.inputs[1].final_script_witness = Some(vec![vec![0x52]]);
        b.inputs[0].final_script_sig = Some(Script::from(vec![0x00]));
        a.merge(b).unwrap();
        assert_eq!(
            a.inputs[0].final_script_sig,
            Some(Script::from(vec![0x01, 0x51]))
        );

        let tx = a.clone().extract_tx();
        assert_eq!(tx.inputs[0].script_sig, Script::from(vec![0x01, 0x51]));
        assert_eq!(tx.inputs[1].witness, vec![vec![0x52]]);
        assert!(tx.has_witness());
        assert_ne!(tx.txid(), a.unsigned_tx().txid());

        let mut c = spend(&prev);
        c.global.unsigned_tx.version = 1;
        assert!(matches!(
            a.merge(c),
            Err(crate::Error::Psbt(Error::UnexpectedUnsignedTx { .. }))
        ));
        let mut d = spend(&prev);
        d.outputs.clear();
        assert!(matches!(
            a.merge(d),
            Err(crate::Error::Psbt(Error::OutputCountMismatch { .. }))
        ));
    }

    #[test]
    fn merge_other_tx_with_more_inputs() {
        let prev = prev_tx();
        let mut a = spend(&prev);
        a.global.unsigned_tx.inputs.truncate(1);
        a.inputs.truncate(1);
        let b = spend(&prev);
        match a.merge(b) {
            Err(crate::Error::Psbt(Error::UnexpectedUnsignedTx { expected, actual })) => {
                assert_eq!(expected.inputs.len(), 1);
                assert_eq!(actual.inputs.len(), 2);
            }
            other => panic!("expected UnexpectedUnsignedTx, got {:?}", other),
        }
        assert_eq!(a.inputs.len(), 1);
    }
}
