use crate::bitcoin::Encodable;
use crate::Error;
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use ring::digest::{digest, SHA256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A struct representing a hash, specifically a SHA256d hash.
///
/// This is the hash type that is generally used within the Bitcoin infrastructure, for example
/// to identify transactions.
///
/// Note that [TxHash] is a type alias for [struct@Hash] and should generally be used when
/// referring to transactions.
/// [TxHash]: crate::bitcoin::TxHash
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash {
    pub raw: [u8; 32],
}

impl Hash {
    pub const SIZE: u64 = 32;
    pub const HEX_SIZE: u64 = Hash::SIZE * 2;
    pub const ZERO: Hash = Hash {
        raw: [0; Self::SIZE as usize],
    };

    /// Double SHA256 hash the given data.
    pub fn sha256d(data: &[u8]) -> Hash {
        let sha256 = digest(&SHA256, data);
        let sha256d = digest(&SHA256, sha256.as_ref());
        let mut hash256 = [0; 32];
        hash256.clone_from_slice(sha256d.as_ref());
        Hash { raw: hash256 }
    }

    /// Create a hash from a slice of exactly 32 bytes, in encoded (not display) order.
    pub fn from_slice(slice: &[u8]) -> crate::Result<Hash> {
        let raw = <[u8; 32]>::try_from(slice).map_err(|_| {
            Error::BadArgument(format!("hash must be 32 bytes, got {}", slice.len()))
        })?;
        Ok(Hash { raw })
    }

    // helper for ToHex trait implementation
    fn generic_encode_hex<T, F>(&self, mut encode_fn: F) -> T
    where
        T: FromIterator<char>,
        F: FnMut(&[u8]) -> String,
    {
        let mut reversed_bytes = self.raw;
        reversed_bytes.reverse();
        encode_fn(&reversed_bytes).chars().collect()
    }
}

impl Encodable for Hash {
    fn from_binary(buffer: &mut dyn Buf) -> crate::Result<Self>
    where
        Self: Sized,
    {
        if buffer.remaining() < Self::SIZE as usize {
            Err(Error::DataTooSmall)
        } else {
            let mut hash = [0; 32];
            buffer.copy_to_slice(&mut hash);
            Ok(Self { raw: hash })
        }
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> crate::Result<()> {
        buffer.put_slice(&self.raw);
        Ok(())
    }

    fn encoded_size(&self) -> u64 {
        Self::SIZE
    }
}

impl FromHex for Hash {
    type Error = Error;

    /// Converts a string of 64 hex characters into a hash. The bytes of the hex encoded form are reversed in
    /// accordance with Bitcoin standards.
    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self, Self::Error> {
        let hex = hex.as_ref();
        if hex.len() != Hash::HEX_SIZE as usize {
            let msg = format!(
                "Length of hex encoded hash must be 64. Len is {:}.",
                hex.len()
            );
            return Err(Error::BadArgument(msg));
        }
        match hex::decode(hex) {
            Ok(mut hash_bytes) => {
                // Reverse bytes in place to match Bitcoin standard representation.
                hash_bytes.reverse();
                let mut hash_array = [0u8; Hash::SIZE as usize];
                hash_array.copy_from_slice(&hash_bytes);
                Ok(Hash { raw: hash_array })
            }
            Err(e) => Err(Error::FromHexError(e)),
        }
    }
}

impl ToHex for Hash {
    /// Converts the hash into a hex string. The bytes are reversed in the hex string in accordance with
    /// Bitcoin standard representation.
    fn encode_hex<T: FromIterator<char>>(&self) -> T {
        self.generic_encode_hex(|bytes| hex::encode(bytes))
    }

    fn encode_hex_upper<T: FromIterator<char>>(&self) -> T {
        self.generic_encode_hex(|bytes| hex::encode_upper(bytes))
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl From<[u8; 32]> for Hash {
    fn from(value: [u8; 32]) -> Self {
        Hash { raw: value }
    }
}

impl From<Hash> for [u8; 32] {
    /// Convert from Hash to u8 encoding
    fn from(value: Hash) -> Self {
        value.raw
    }
}

impl From<Hash> for Vec<u8> {
    fn from(value: Hash) -> Self {
        value.raw.to_vec()
    }
}

impl Ord for Hash {
    /// Define the ordering of hashes. The order direction matches the alphabetic ordering of
    /// their hex representations.
    ///
    /// The ordering is byte-wise from the last byte to the first of the encoded form. This matches
    /// the alphabetical ordering of the hex representation since the hex representation is
    /// reversed byte-wise.
    fn cmp(&self, other: &Hash) -> Ordering {
        self.raw.iter().rev().cmp(other.raw.iter().rev())
    }
}

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Hash) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode_hex::<String>())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode_hex::<String>())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.encode_hex::<String>().as_ref())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
