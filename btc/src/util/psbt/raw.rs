//! Raw PSBT key-value pairs.
//!
//! Every map in a PSBT is a list of pairs. A key is a CompactSize length, a type byte and key
//! data; a value is a CompactSize length and the value bytes. A key of length zero ends the map.

use crate::bitcoin::{varint_decode, varint_encode, varint_size};
use crate::util::psbt::Error;
use crate::Result;
use bytes::{Buf, BufMut};
use std::fmt;

/// A PSBT key in its raw byte form.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone)]
pub struct Key {
    /// The type of this PSBT key.
    pub type_value: u8,
    /// The key itself in raw byte form.
    pub key: Vec<u8>,
}

/// A PSBT key-value pair in its raw byte form.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pair {
    /// The key of this key-value pair.
    pub key: Key,
    /// The value of this key-value pair in raw byte form.
    pub value: Vec<u8>,
}

/// A proprietary key: an identifying prefix, a subtype and the key data.
///
/// The key data of a raw key with type `0xFC` is the CompactSize-prefixed identifier, the
/// subtype byte and then the rest of the key.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone)]
pub struct ProprietaryKey {
    /// Identifies the owner of the key, usually an ASCII name.
    pub prefix: Vec<u8>,
    /// Owner-defined key type.
    pub subtype: u8,
    /// Additional key bytes.
    pub key: Vec<u8>,
}

/// The type value of proprietary keys, shared by all maps.
pub const PSBT_PROPRIETARY: u8 = 0xFC;

fn read_bytes(buffer: &mut dyn Buf, len: usize) -> Result<Vec<u8>> {
    if buffer.remaining() < len {
        return Err(crate::Error::DataTooSmall);
    }
    let mut v = vec![0u8; len];
    buffer.copy_to_slice(&mut v);
    Ok(v)
}

impl Key {
    /// Read a key. Returns `None` for the zero-length key that ends a map.
    pub fn decode(buffer: &mut dyn Buf) -> Result<Option<Key>> {
        let byte_size = varint_decode(buffer)? as usize;
        if byte_size == 0 {
            return Ok(None);
        }
        let type_value = buffer.try_get_u8()?;
        let key = read_bytes(buffer, byte_size - 1)?;
        Ok(Some(Key { type_value, key }))
    }

    pub fn encode(&self, buffer: &mut dyn BufMut) -> Result<()> {
        varint_encode(buffer, self.key.len() as u64 + 1)?;
        buffer.put_u8(self.type_value);
        buffer.put_slice(&self.key);
        Ok(())
    }

    pub fn encoded_size(&self) -> u64 {
        let l = self.key.len() as u64 + 1;
        varint_size(l) + l
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "type: {:#04x}, key: {}", self.type_value, hex::encode(&self.key))
    }
}

impl Pair {
    /// Read a pair. Returns `None` when the map separator is reached.
    pub fn decode(buffer: &mut dyn Buf) -> Result<Option<Pair>> {
        let key = match Key::decode(buffer)? {
            Some(key) => key,
            None => return Ok(None),
        };
        let len = varint_decode(buffer)? as usize;
        let value = read_bytes(buffer, len)?;
        Ok(Some(Pair { key, value }))
    }

    pub fn encode(&self, buffer: &mut dyn BufMut) -> Result<()> {
        self.key.encode(buffer)?;
        varint_encode(buffer, self.value.len() as u64)?;
        buffer.put_slice(&self.value);
        Ok(())
    }

    pub fn encoded_size(&self) -> u64 {
        let l = self.value.len() as u64;
        self.key.encoded_size() + varint_size(l) + l
    }
}

impl ProprietaryKey {
    /// Split the key data of a raw proprietary key.
    pub fn from_key(key: Key) -> Result<ProprietaryKey> {
        if key.type_value != PSBT_PROPRIETARY {
            return Err(Error::InvalidProprietaryKey.into());
        }
        let mut data = &key.key[..];
        let prefix_len = varint_decode(&mut data)? as usize;
        let prefix = read_bytes(&mut data, prefix_len)?;
        let subtype = data.try_get_u8()?;
        Ok(ProprietaryKey {
            prefix,
            subtype,
            key: data.to_vec(),
        })
    }

    /// The raw key for this proprietary key.
    pub fn to_key(&self) -> Key {
        let mut key = Vec::with_capacity(self.prefix.len() + self.key.len() + 10);
        // writing to a vec does not fail
        let _ = varint_encode(&mut key, self.prefix.len() as u64);
        key.extend_from_slice(&self.prefix);
        key.push(self.subtype);
        key.extend_from_slice(&self.key);
        Key {
            type_value: PSBT_PROPRIETARY,
            key,
        }
    }
}
