//! Encoding of the typed keys and values held in PSBT maps.
//!
//! A value is stored without a length prefix because the raw pair already frames it, so a
//! value must be consumed exactly when it is decoded.

use crate::bitcoin::{decode_witness, encode_witness};
use crate::bitcoin::{
    Encodable, Hash, Hash160, PublicKey, Ripemd160Hash, Script, Sha256Hash, SigHashType, Tx,
    TxOutput,
};
use crate::util::bip32::{ChildNumber, DerivationPath, ExtendedPubKey, Fingerprint, KeySource};
use crate::util::psbt::Error;
use crate::Result;
use bytes::Buf;

/// Encode a key or value for a PSBT map.
pub trait PsbtSerialize {
    fn serialize(&self) -> Vec<u8>;
}

/// Decode a key or value of a PSBT map. All of the bytes must be used.
pub trait PsbtDeserialize: Sized {
    fn deserialize(bytes: &[u8]) -> Result<Self>;
}

/// Run a decoder over the bytes and fail if anything is left over.
fn decode_exact<T>(
    bytes: &[u8],
    what: &str,
    decode: impl FnOnce(&mut dyn Buf) -> Result<T>,
) -> Result<T> {
    let mut slice = bytes;
    let value = decode(&mut slice)?;
    if slice.has_remaining() {
        return Err(Error::InvalidValue(format!(
            "{} bytes left over after decoding {}",
            slice.remaining(),
            what
        ))
        .into());
    }
    Ok(value)
}

// Writing to a vec can not fail.
fn encode_to_vec(value: &impl Encodable) -> Vec<u8> {
    value
        .to_binary_vec()
        .expect("encoding into a vec is infallible")
}

impl PsbtSerialize for Tx {
    fn serialize(&self) -> Vec<u8> {
        encode_to_vec(self)
    }
}

impl PsbtDeserialize for Tx {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        decode_exact(bytes, "transaction", |b| Tx::from_binary(b))
    }
}

impl PsbtSerialize for TxOutput {
    fn serialize(&self) -> Vec<u8> {
        encode_to_vec(self)
    }
}

impl PsbtDeserialize for TxOutput {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        decode_exact(bytes, "transaction output", |b| TxOutput::from_binary(b))
    }
}

impl PsbtSerialize for Script {
    fn serialize(&self) -> Vec<u8> {
        self.raw.clone()
    }
}

impl PsbtDeserialize for Script {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(Script::from(bytes))
    }
}

impl PsbtSerialize for Vec<u8> {
    fn serialize(&self) -> Vec<u8> {
        self.clone()
    }
}

impl PsbtDeserialize for Vec<u8> {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

impl PsbtSerialize for PublicKey {
    fn serialize(&self) -> Vec<u8> {
        self.to_bytes()
    }
}

impl PsbtDeserialize for PublicKey {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        PublicKey::from_slice(bytes)
    }
}

impl PsbtSerialize for SigHashType {
    fn serialize(&self) -> Vec<u8> {
        self.to_u32().to_le_bytes().to_vec()
    }
}

impl PsbtDeserialize for SigHashType {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        let n = u32::deserialize(bytes)?;
        SigHashType::from_standard(n).ok_or_else(|| Error::NonStandardSigHashType(n).into())
    }
}

impl PsbtSerialize for u32 {
    fn serialize(&self) -> Vec<u8> {
        self.to_le_bytes().to_vec()
    }
}

impl PsbtDeserialize for u32 {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        let raw = <[u8; 4]>::try_from(bytes).map_err(|_| {
            Error::InvalidValue(format!("expected 4 byte integer, got {} bytes", bytes.len()))
        })?;
        Ok(u32::from_le_bytes(raw))
    }
}

impl PsbtSerialize for KeySource {
    fn serialize(&self) -> Vec<u8> {
        let (fingerprint, path) = self;
        let mut rv = Vec::with_capacity(4 + 4 * path.len());
        rv.extend_from_slice(fingerprint.as_bytes());
        for cn in path.as_slice() {
            rv.extend_from_slice(&u32::from(*cn).to_le_bytes());
        }
        rv
    }
}

impl PsbtDeserialize for KeySource {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 || bytes.len() % 4 != 0 {
            return Err(Error::InvalidValue(format!(
                "key source must be a fingerprint and 4 byte path elements, got {} bytes",
                bytes.len()
            ))
            .into());
        }
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&bytes[..4]);
        let path: Vec<ChildNumber> = bytes[4..]
            .chunks_exact(4)
            .map(|c| ChildNumber::from(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        Ok((Fingerprint::from(fingerprint), DerivationPath::from(path)))
    }
}

/// Witness stacks (`final_script_witness`) use the same layout as in a transaction.
impl PsbtSerialize for Vec<Vec<u8>> {
    fn serialize(&self) -> Vec<u8> {
        let mut rv = Vec::new();
        // writing to a vec does not fail
        let _ = encode_witness(&mut rv, self);
        rv
    }
}

impl PsbtDeserialize for Vec<Vec<u8>> {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        decode_exact(bytes, "witness", |b| decode_witness(b))
    }
}

impl PsbtSerialize for ExtendedPubKey {
    fn serialize(&self) -> Vec<u8> {
        self.encode().to_vec()
    }
}

impl PsbtDeserialize for ExtendedPubKey {
    fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(ExtendedPubKey::decode(bytes)?)
    }
}

macro_rules! impl_psbt_hash {
    ($ty:ident, $field:ident) => {
        impl PsbtSerialize for $ty {
            fn serialize(&self) -> Vec<u8> {
                self.$field.to_vec()
            }
        }

        impl PsbtDeserialize for $ty {
            fn deserialize(bytes: &[u8]) -> Result<Self> {
                $ty::from_slice(bytes)
            }
        }
    };
}

impl_psbt_hash!(Hash, raw);
impl_psbt_hash!(Hash160, hash);
impl_psbt_hash!(Sha256Hash, hash);
impl_psbt_hash!(Ripemd160Hash, hash);
