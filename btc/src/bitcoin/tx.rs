use crate::bitcoin::hash::Hash;
use crate::bitcoin::{varint_decode, varint_encode, varint_size};
use crate::bitcoin::{Encodable, Script};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The TxHash is used to identify transactions.
pub type TxHash = Hash;

/// A Bitcoin transaction.
///
/// Transactions are encoded in the BIP144 format: if any input carries a witness then the input
/// count is preceded by a zero marker byte and a one flag byte, and the witnesses follow the
/// outputs. The transaction id never covers the witnesses.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tx {
    /// transaction version number
    pub version: u32,
    /// Vector of inputs.
    pub inputs: Vec<TxInput>,
    /// Vector of outputs.
    pub outputs: Vec<TxOutput>,
    /// lock time
    pub lock_time: u32,
}

impl Tx {
    /// The transaction id, the hash of the encoding without witnesses.
    pub fn txid(&self) -> TxHash {
        Hash::sha256d(&self.to_vec(false))
    }

    /// The witness transaction id, the hash of the full encoding.
    ///
    /// This is the same as [Tx::txid()] when no input has a witness.
    pub fn wtxid(&self) -> TxHash {
        Hash::sha256d(&self.to_vec(true))
    }

    /// Whether any input has a witness.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|i| !i.witness.is_empty())
    }

    /// Read a transaction that is known to have no witnesses.
    ///
    /// The general decoder can not tell a zero-input transaction from a segwit marker, this one
    /// never looks for the marker.
    pub fn from_binary_legacy(buffer: &mut dyn Buf) -> Result<Tx> {
        let version = buffer.try_get_u32_le()?;
        let inputs = decode_list(buffer, TxInput::from_binary)?;
        let outputs = decode_list(buffer, TxOutput::from_binary)?;
        let lock_time = buffer.try_get_u32_le()?;
        Ok(Tx {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Write the transaction without witnesses.
    pub fn to_binary_legacy(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.write(buffer, false)
    }

    /// Size of the encoding without witnesses.
    pub fn legacy_size(&self) -> u64 {
        let mut size =
            varint_size(self.inputs.len() as u64) + varint_size(self.outputs.len() as u64);
        for input in self.inputs.iter() {
            size += input.encoded_size();
        }
        for output in self.outputs.iter() {
            size += output.encoded_size();
        }
        size + 8
    }

    fn write(&self, buffer: &mut dyn BufMut, witness: bool) -> Result<()> {
        let witness = witness && self.has_witness();
        buffer.put_u32_le(self.version);
        if witness {
            buffer.put_u8(0);
            buffer.put_u8(1);
        }
        varint_encode(buffer, self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.to_binary(buffer)?;
        }
        varint_encode(buffer, self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.to_binary(buffer)?;
        }
        if witness {
            for input in &self.inputs {
                encode_witness(buffer, &input.witness)?;
            }
        }
        buffer.put_u32_le(self.lock_time);
        Ok(())
    }

    // Writing into a Vec can not fail.
    fn to_vec(&self, witness: bool) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.encoded_size() as usize);
        self.write(&mut v, witness)
            .expect("writing a transaction to a vec is infallible");
        v
    }
}

impl FromHex for Tx {
    type Error = Error;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        let bytes = hex::decode(hex)?;
        let mut slice = &bytes[..];
        let tx = Tx::from_binary(&mut slice)?;
        if slice.has_remaining() {
            return Err(Error::BadData(format!(
                "{} bytes after end of transaction",
                slice.remaining()
            )));
        }
        Ok(tx)
    }
}

impl ToHex for Tx {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        self.to_vec(true).encode_hex()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        self.to_vec(true).encode_hex_upper()
    }
}

impl Encodable for Tx {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self>
    where
        Self: Sized,
    {
        let version = buffer.try_get_u32_le()?;
        let mut num_inputs = varint_decode(buffer)?;
        let mut segwit = false;
        if num_inputs == 0 && buffer.has_remaining() && buffer.chunk()[0] == 1 {
            buffer.advance(1);
            segwit = true;
            num_inputs = varint_decode(buffer)?;
        }
        let mut inputs = Vec::with_capacity(bounded_capacity(num_inputs, buffer));
        for _ in 0..num_inputs {
            inputs.push(TxInput::from_binary(buffer)?);
        }
        let outputs = decode_list(buffer, TxOutput::from_binary)?;
        if segwit {
            for input in inputs.iter_mut() {
                input.witness = decode_witness(buffer)?;
            }
            if inputs.iter().all(|i| i.witness.is_empty()) {
                return Err(Error::BadData(
                    "segwit flag set but transaction has no witnesses".to_string(),
                ));
            }
        }
        let lock_time = buffer.try_get_u32_le()?;
        Ok(Tx {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.write(buffer, true)
    }

    fn encoded_size(&self) -> u64 {
        let mut size = self.legacy_size();
        if self.has_witness() {
            size += 2;
            for input in self.inputs.iter() {
                size += witness_size(&input.witness);
            }
        }
        size
    }
}

/// An Outpoint is a reference to a specific output of a specific transaction.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Outpoint {
    /// The transaction containing the output.
    pub txid: TxHash,
    /// The index of the output.
    pub vout: u32,
}

impl Outpoint {
    pub const SIZE: u64 = 36;

    pub fn new(txid: TxHash, vout: u32) -> Outpoint {
        Outpoint { txid, vout }
    }

    /// The outpoint used by coinbase inputs.
    pub fn null() -> Outpoint {
        Outpoint {
            txid: TxHash::ZERO,
            vout: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Outpoint::null()
    }
}

impl Default for Outpoint {
    fn default() -> Self {
        Outpoint::null()
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl Encodable for Outpoint {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self>
    where
        Self: Sized,
    {
        if buffer.remaining() < Self::SIZE as usize {
            Err(Error::DataTooSmall)
        } else {
            let txid = TxHash::from_binary(buffer)?;
            let vout = buffer.get_u32_le();
            Ok(Outpoint { txid, vout })
        }
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.txid.to_binary(buffer)?;
        buffer.put_u32_le(self.vout);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE
    }
}

/// A TxInput is an input to a transaction.
///
/// The witness is not part of the input encoding; it is written by the enclosing [Tx].
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default, Serialize, Deserialize)]
pub struct TxInput {
    pub outpoint: Outpoint,
    pub script_sig: Script,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl TxInput {
    /// An unsigned input spending the given outpoint.
    pub fn new(outpoint: Outpoint, sequence: u32) -> TxInput {
        TxInput {
            outpoint,
            script_sig: Script::new(),
            sequence,
            witness: Vec::new(),
        }
    }
}

impl Encodable for TxInput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self> {
        let outpoint = Outpoint::from_binary(buffer)?;
        let script_sig = Script::from_binary(buffer)?;
        let sequence = buffer.try_get_u32_le()?;
        Ok(TxInput {
            outpoint,
            script_sig,
            sequence,
            witness: Vec::new(),
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.outpoint.to_binary(buffer)?;
        self.script_sig.to_binary(buffer)?;
        buffer.put_u32_le(self.sequence);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        self.outpoint.encoded_size() + self.script_sig.encoded_size() + 4
    }
}

/// A TxOutput is an output from a transaction.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in satoshis.
    pub value: u64,
    pub script_pubkey: Script,
}

impl TxOutput {
    /// Simple new function.
    pub fn new(value: u64, script_pubkey: Script) -> TxOutput {
        TxOutput {
            value,
            script_pubkey,
        }
    }
}

impl Encodable for TxOutput {
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self>
    where
        Self: Sized,
    {
        let value = buffer.try_get_u64_le()?;
        let script_pubkey = Script::from_binary(buffer)?;
        Ok(TxOutput {
            value,
            script_pubkey,
        })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        buffer.put_u64_le(self.value);
        self.script_pubkey.to_binary(buffer)?;
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        self.script_pubkey.encoded_size() + 8
    }
}

/// Read a witness stack: an item count followed by length-prefixed items.
pub(crate) fn decode_witness(buffer: &mut dyn Buf) -> Result<Vec<Vec<u8>>> {
    let count = varint_decode(buffer)?;
    let mut items = Vec::with_capacity(bounded_capacity(count, buffer));
    for _ in 0..count {
        let len = varint_decode(buffer)? as usize;
        if buffer.remaining() < len {
            return Err(Error::DataTooSmall);
        }
        let mut item = vec![0u8; len];
        buffer.copy_to_slice(&mut item);
        items.push(item);
    }
    Ok(items)
}

pub(crate) fn encode_witness(buffer: &mut dyn BufMut, witness: &[Vec<u8>]) -> Result<()> {
    varint_encode(buffer, witness.len() as u64)?;
    for item in witness {
        varint_encode(buffer, item.len() as u64)?;
        buffer.put_slice(item);
    }
    Ok(())
}

pub(crate) fn witness_size(witness: &[Vec<u8>]) -> u64 {
    witness.iter().fold(varint_size(witness.len() as u64), |acc, item| {
        acc + varint_size(item.len() as u64) + item.len() as u64
    })
}

fn decode_list<T>(
    buffer: &mut dyn Buf,
    decode: fn(&mut dyn Buf) -> Result<T>,
) -> Result<Vec<T>> {
    let count = varint_decode(buffer)?;
    let mut items = Vec::with_capacity(bounded_capacity(count, buffer));
    for _ in 0..count {
        items.push(decode(buffer)?);
    }
    Ok(items)
}

// A count read from untrusted data can not be larger than the bytes that remain.
fn bounded_capacity(count: u64, buffer: &dyn Buf) -> usize {
    count.min(buffer.remaining() as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitcoin::FromHex;
    use bytes::Bytes;

    /// Read a transaction from a byte array and check it
    #[test]
    fn tx_read() {
        let (tx_bin, tx_hash) = get_tx1();
        let l = tx_bin.len() as u64;
        let mut bytes = Bytes::from(tx_bin);
        let tx = Tx::from_binary(&mut bytes).unwrap();
        assert_eq!(tx.version, 1);
        assert_eq!(tx.txid(), tx_hash);
        assert_eq!(tx.wtxid(), tx_hash);
        assert_eq!(l, tx.encoded_size());
        assert!(!tx.has_witness());
    }

    /// If the binary is incomplete, we should get an error
    #[test]
    fn read_short() {
        let (tx_bin, _tx_hash) = get_tx1();
        let mut bytes = Bytes::from(tx_bin);
        let mut b2 = bytes.split_to(200);
        assert!(Tx::from_binary(&mut b2).is_err());
    }

    /// If we supply too many bytes then the read should succeed and we should have some bytes left over.
    #[test]
    fn tx_long() {
        let (mut tx_bin, tx_hash) = get_tx1();
        tx_bin.append(&mut vec![0u8; 100]);
        let mut bytes = Bytes::from(tx_bin);
        let tx = Tx::from_binary(&mut bytes).unwrap();
        assert_eq!(tx.encoded_size(), 211);
        assert_eq!(bytes.remaining(), 100);
        assert_eq!(tx.txid(), tx_hash);
    }

    #[test]
    fn read_from_hex() {
        let (tx_bin, tx_hash) = get_tx1();
        let tx = Tx::from_hex(hex::encode(&tx_bin)).unwrap();
        let tx2 = Tx::from_hex(tx.encode_hex::<String>()).unwrap();
        assert_eq!(tx.txid(), tx_hash);
        assert_eq!(tx2, tx);
        assert!(Tx::from_hex(format!("{}00", hex::encode(&tx_bin))).is_err());
    }

    #[test]
    fn check_deser() {
        let (tx_bin, tx_hash) = get_tx1();
        let mut bytes = Bytes::from(tx_bin);
        let tx = Tx::from_binary(&mut bytes).unwrap();
        assert_eq!(tx.txid(), tx_hash);
        assert_eq!(tx.version, 1);
        assert_eq!(tx.inputs.len(), 1);
        let i = tx.inputs.first().unwrap();
        assert_eq!(
            i.outpoint.txid,
            Hash::from_hex("755f816c02d01c9c0a2f80079132d7b05a1891dc0c860afc6b13e27adc2e058a")
                .unwrap()
        );
        assert_eq!(i.outpoint.vout, 1);
        assert_eq!(tx.outputs.len(), 2);
        assert!(tx.outputs[0].script_pubkey.is_op_return());
        assert!(tx.outputs[1].script_pubkey.is_p2pkh());
    }

    #[test]
    fn witness_round_trip() {
        let (tx_bin, tx_hash) = get_tx1();
        let mut tx = Tx::from_binary(&mut &tx_bin[..]).unwrap();
        tx.inputs[0].script_sig = Script::new();
        tx.inputs[0].witness = vec![vec![0x30; 71], vec![0x02; 33]];
        let txid = tx.txid();
        assert_ne!(txid, tx_hash);
        assert_ne!(tx.wtxid(), txid);

        let v = tx.to_binary_vec().unwrap();
        assert_eq!(&v[4..6], &[0, 1]);
        assert_eq!(v.len() as u64, tx.encoded_size());
        let tx2 = Tx::from_binary(&mut &v[..]).unwrap();
        assert_eq!(tx2, tx);
        assert_eq!(tx2.txid(), txid);

        let mut legacy = Vec::new();
        tx.to_binary_legacy(&mut legacy).unwrap();
        assert_eq!(legacy.len() as u64, tx.legacy_size());
        let tx3 = Tx::from_binary_legacy(&mut &legacy[..]).unwrap();
        assert!(tx3.inputs[0].witness.is_empty());
        assert_eq!(tx3.txid(), txid);
    }

    #[test]
    fn segwit_flag_without_witnesses_rejected() {
        let (tx_bin, _) = get_tx1();
        let tx = Tx::from_binary(&mut &tx_bin[..]).unwrap();
        let mut v = Vec::new();
        v.put_u32_le(tx.version);
        v.put_slice(&[0, 1]);
        varint_encode(&mut v, 1).unwrap();
        tx.inputs[0].to_binary(&mut v).unwrap();
        varint_encode(&mut v, 2).unwrap();
        for o in &tx.outputs {
            o.to_binary(&mut v).unwrap();
        }
        v.put_u8(0);
        v.put_u32_le(tx.lock_time);
        assert!(matches!(Tx::from_binary(&mut &v[..]), Err(Error::BadData(_))));
    }

    #[test]
    fn zero_input_legacy() {
        let tx = Tx {
            version: 2,
            inputs: vec![],
            outputs: vec![TxOutput::new(1000, Script::from(vec![0x51]))],
            lock_time: 0,
        };
        let mut v = Vec::new();
        tx.to_binary_legacy(&mut v).unwrap();
        assert_eq!(Tx::from_binary_legacy(&mut &v[..]).unwrap(), tx);
    }

    #[test]
    fn outpoint_null() {
        assert!(Outpoint::default().is_null());
        let (tx_bin, _) = get_tx1();
        let tx = Tx::from_binary(&mut &tx_bin[..]).unwrap();
        assert!(!tx.inputs[0].outpoint.is_null());
        assert_eq!(
            tx.inputs[0].outpoint.to_string(),
            "755f816c02d01c9c0a2f80079132d7b05a1891dc0c860afc6b13e27adc2e058a:1"
        );
    }

    /// Test Rust standard serde of transaction and sub-structs.
    #[test]
    fn test_bincode() {
        let config = bincode::config::legacy();
        let (tx_bin, tx_hash) = get_tx1();
        let mut bytes = Bytes::from(tx_bin);
        let tx = Tx::from_binary(&mut bytes).unwrap();
        let e = bincode::serde::encode_to_vec(&tx, config).unwrap();
        let (tx2, _): (Tx, usize) = bincode::serde::decode_from_slice(&e, config).unwrap();
        assert_eq!(tx2.txid(), tx_hash);
    }

    fn get_tx1() -> (Vec<u8>, Hash) {
        let tx_hex = "01000000018a052edc7ae2136bfc0a860cdc91185ab0d7329107802f0a9c1cd0026c815f75010000006b483045022100e587ef1b4497a6694cad646cab468b6ece2fa98c7f49f9488611ca34eecebd1002205c4ea9066484bd1bffb7fdd7d84b5ae0ee6b7cdc20a8a513e41e420e0633b98841210262142850483b6728b8ecd299e4d0c8cf30ea0636f66205166814e52d73b64b4bffffffff0200000000000000000a006a075354554b2e434fb8ce3f01000000001976a91454cba8da8701174e34aac2bb31d42a88e2c302d088ac00000000";
        let tx_hash = "3abc31f8ff40ffb66d9037e156842fe782e6fa1ae728759263471c68660095f1";
        let tx_bin = hex::decode(tx_hex).unwrap();
        (tx_bin, Hash::from_hex(tx_hash).unwrap())
    }
}
