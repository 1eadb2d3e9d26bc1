use crate::bitcoin::Encodable;
use crate::Error;
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use ring::digest::{digest, SHA256};
use ripemd::digest::Update;
use ripemd::{Digest, Ripemd160};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 160-bit hash, specifically the RIPEMD160(SHA256) hash.
///
/// This is the hash type that is generally used for Bitcoin addresses: public key hashes and
/// script hashes are both Hash160 values.
///
/// Unlike [struct@crate::bitcoin::Hash], the hex form is not reversed. It matches the bytes as
/// they appear inside a script.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash160 {
    pub hash: [u8; Self::SIZE],
}

impl Hash160 {
    pub const SIZE: usize = 20;
    pub const HEX_SIZE: usize = Hash160::SIZE * 2;
    pub const ZERO: Hash160 = Hash160 {
        hash: [0; Self::SIZE],
    };

    /// Generate the hash from the given data.
    pub fn generate(data: &[u8]) -> Hash160 {
        let sha256 = digest(&SHA256, data);
        let mut r_hasher = Ripemd160::new();
        Update::update(&mut r_hasher, sha256.as_ref());
        let ripemd = r_hasher.finalize();
        let mut hash = [0; Self::SIZE];
        hash.clone_from_slice(ripemd.as_ref());
        Hash160 { hash }
    }

    /// Create a hash from a slice of exactly 20 bytes.
    pub fn from_slice(slice: &[u8]) -> crate::Result<Hash160> {
        let hash = <[u8; Self::SIZE]>::try_from(slice).map_err(|_| {
            Error::BadArgument(format!("hash160 must be 20 bytes, got {}", slice.len()))
        })?;
        Ok(Hash160 { hash })
    }
}

impl Encodable for Hash160 {
    fn from_binary(buffer: &mut dyn Buf) -> crate::Result<Self>
    where
        Self: Sized,
    {
        if buffer.remaining() < Self::SIZE {
            Err(Error::DataTooSmall)
        } else {
            let mut hash = [0; Self::SIZE];
            buffer.copy_to_slice(&mut hash);
            Ok(Self { hash })
        }
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> crate::Result<()> {
        buffer.put_slice(&self.hash);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE as u64
    }
}

impl FromHex for Hash160 {
    type Error = Error;

    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self, Self::Error> {
        let hex = hex.as_ref();
        if hex.len() != Self::HEX_SIZE {
            let msg = format!(
                "Length of hex encoded hash must be {}. Len is {:}.",
                Self::HEX_SIZE,
                hex.len()
            );
            return Err(Error::BadArgument(msg));
        }
        let bytes = hex::decode(hex)?;
        Self::from_slice(&bytes)
    }
}

impl ToHex for Hash160 {
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        self.hash.encode_hex()
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        self.hash.encode_hex_upper()
    }
}

impl FromStr for Hash160 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for Hash160 {
    fn from(value: [u8; 20]) -> Self {
        Hash160 { hash: value }
    }
}

impl From<Hash160> for [u8; 20] {
    /// Convert from Hash to u8 encoding
    fn from(value: Hash160) -> Self {
        value.hash
    }
}

impl fmt::Display for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode_hex::<String>())
    }
}

impl fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode_hex::<String>())
    }
}

impl Serialize for Hash160 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.encode_hex::<String>().as_ref())
    }
}

impl<'de> Deserialize<'de> for Hash160 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
