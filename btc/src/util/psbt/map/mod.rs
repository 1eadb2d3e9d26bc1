use crate::util::psbt::raw::{self, Pair, ProprietaryKey};
use crate::util::psbt::serialize::{PsbtDeserialize, PsbtSerialize};
use crate::util::psbt::{Error, PsbtHash};
use crate::Result;
use bytes::{Buf, BufMut};
use log::{debug, trace};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

mod global;
mod input;
mod output;

pub use self::global::Global;
pub use self::input::Input;
pub use self::output::Output;

/// A PSBT key-value map.
pub trait Map {
    /// Add a decoded pair to the map, rejecting keys that are already present.
    fn insert_pair(&mut self, pair: Pair) -> Result<()>;

    /// The pairs of the map in the order they are written.
    fn get_pairs(&self) -> Vec<Pair>;

    /// Combine with another map of the same kind. Values already present are kept.
    fn merge(&mut self, other: Self) -> Result<()>
    where
        Self: Sized;

    /// Write the pairs followed by the separator.
    fn encode_map(&self, buffer: &mut dyn BufMut) -> Result<()> {
        for pair in self.get_pairs() {
            pair.encode(buffer)?;
        }
        buffer.put_u8(0x00);
        Ok(())
    }

    fn encoded_map_size(&self) -> u64 {
        self.get_pairs()
            .iter()
            .fold(1, |acc, pair| acc + pair.encoded_size())
    }
}

/// Read pairs up to the separator into an empty map.
pub(crate) fn decode_map<M: Map + Default>(buffer: &mut dyn Buf) -> Result<M> {
    let mut map = M::default();
    while let Some(pair) = Pair::decode(buffer)? {
        trace!("psbt pair {}, {} byte value", pair.key, pair.value.len());
        map.insert_pair(pair)?;
    }
    Ok(map)
}

/// Decode a value whose key carries nothing but the type.
pub(crate) fn insert_single<T: PsbtDeserialize>(
    slot: &mut Option<T>,
    key: raw::Key,
    value: &[u8],
) -> Result<()> {
    if !key.key.is_empty() {
        return Err(Error::InvalidKey(key).into());
    }
    if slot.is_some() {
        return Err(Error::DuplicateKey(key).into());
    }
    *slot = Some(T::deserialize(value)?);
    Ok(())
}

/// Decode a value keyed by the data that follows the type.
pub(crate) fn insert_keyed<K, V>(map: &mut BTreeMap<K, V>, key: raw::Key, value: &[u8]) -> Result<()>
where
    K: PsbtDeserialize + Ord,
    V: PsbtDeserialize,
{
    match map.entry(K::deserialize(&key.key)?) {
        Entry::Vacant(e) => {
            e.insert(V::deserialize(value)?);
            Ok(())
        }
        Entry::Occupied(_) => Err(Error::DuplicateKey(key).into()),
    }
}

/// Store a hash preimage after checking that it hashes to the key.
pub(crate) fn insert_preimage<H>(
    map: &mut BTreeMap<H, Vec<u8>>,
    key: raw::Key,
    value: Vec<u8>,
    hash_fn: fn(&[u8]) -> H,
    wrap: fn(H) -> PsbtHash,
) -> Result<()>
where
    H: PsbtDeserialize + Ord + Copy,
{
    let hash = H::deserialize(&key.key)?;
    if hash_fn(&value) != hash {
        return Err(Error::InvalidPreimageHashPair {
            preimage: value,
            hash: wrap(hash),
        }
        .into());
    }
    match map.entry(hash) {
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
        Entry::Occupied(_) => Err(Error::DuplicateKey(key).into()),
    }
}

pub(crate) fn insert_proprietary(
    map: &mut BTreeMap<ProprietaryKey, Vec<u8>>,
    key: raw::Key,
    value: Vec<u8>,
) -> Result<()> {
    match map.entry(ProprietaryKey::from_key(key.clone())?) {
        Entry::Vacant(e) => {
            debug!("keeping proprietary psbt key {}", key);
            e.insert(value);
            Ok(())
        }
        Entry::Occupied(_) => Err(Error::DuplicateKey(key).into()),
    }
}

pub(crate) fn insert_unknown(
    map: &mut BTreeMap<raw::Key, Vec<u8>>,
    key: raw::Key,
    value: Vec<u8>,
) -> Result<()> {
    match map.entry(key) {
        Entry::Vacant(e) => {
            debug!("keeping unknown psbt key {}", e.key());
            e.insert(value);
            Ok(())
        }
        Entry::Occupied(e) => Err(Error::DuplicateKey(e.key().clone()).into()),
    }
}

pub(crate) fn push_single<T: PsbtSerialize>(rv: &mut Vec<Pair>, type_value: u8, slot: &Option<T>) {
    if let Some(v) = slot {
        rv.push(Pair {
            key: raw::Key {
                type_value,
                key: vec![],
            },
            value: v.serialize(),
        });
    }
}

pub(crate) fn push_keyed<K, V>(rv: &mut Vec<Pair>, type_value: u8, map: &BTreeMap<K, V>)
where
    K: PsbtSerialize,
    V: PsbtSerialize,
{
    for (k, v) in map.iter() {
        rv.push(Pair {
            key: raw::Key {
                type_value,
                key: k.serialize(),
            },
            value: v.serialize(),
        });
    }
}

/// Append the proprietary and unknown pairs, which always come last.
pub(crate) fn push_extra(
    rv: &mut Vec<Pair>,
    proprietary: &BTreeMap<ProprietaryKey, Vec<u8>>,
    unknown: &BTreeMap<raw::Key, Vec<u8>>,
) {
    for (key, value) in proprietary.iter() {
        rv.push(Pair {
            key: key.to_key(),
            value: value.clone(),
        });
    }
    for (key, value) in unknown.iter() {
        rv.push(Pair {
            key: key.clone(),
            value: value.clone(),
        });
    }
}

pub(crate) fn merge_option<T>(ours: &mut Option<T>, theirs: Option<T>) {
    if ours.is_none() {
        *ours = theirs;
    }
}

pub(crate) fn merge_map<K: Ord, V>(ours: &mut BTreeMap<K, V>, theirs: BTreeMap<K, V>) {
    for (k, v) in theirs {
        ours.entry(k).or_insert(v);
    }
}
