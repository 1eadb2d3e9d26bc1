//! BIP32 extended public keys and key origin information.
//!
//! Only what partially signed transactions need is here: parsing and printing extended public
//! keys, key fingerprints and derivation paths. Key derivation is not implemented.

use crate::bitcoin::{base58ck, Hash160, Network};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A BIP32 error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A child number was provided that was out of range
    InvalidChildNumber(u32),
    /// Invalid childnumber format.
    InvalidChildNumberFormat,
    /// Invalid derivation path format.
    InvalidDerivationPathFormat,
    /// Unknown version magic bytes
    UnknownVersion([u8; 4]),
    /// Encoded extended key data has wrong length
    WrongExtendedKeyLength(usize),
    /// The public key inside the extended key is invalid
    Secp256k1(secp256k1::Error),
    /// Base58 decoding error
    Base58(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidChildNumber(n) => {
                write!(f, "child number {} is invalid (not within [0, 2^31 - 1])", n)
            }
            Error::InvalidChildNumberFormat => f.write_str("invalid child number format"),
            Error::InvalidDerivationPathFormat => f.write_str("invalid derivation path format"),
            Error::UnknownVersion(v) => {
                write!(f, "unknown version magic bytes: {}", hex::encode(v))
            }
            Error::WrongExtendedKeyLength(l) => {
                write!(f, "encoded extended key data has wrong length {}", l)
            }
            Error::Secp256k1(e) => write!(f, "secp256k1 error: {}", e),
            Error::Base58(e) => write!(f, "base58 error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Secp256k1(e) => Some(e),
            _ => None,
        }
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Secp256k1(e)
    }
}

/// The first four bytes of the identifier of a key.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 4]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Fingerprint {
    fn from(value: [u8; 4]) -> Self {
        Fingerprint(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

impl FromStr for Fingerprint {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut raw = [0u8; 4];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Fingerprint(raw))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// A child number for a derived key
#[derive(Copy, Clone, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
pub enum ChildNumber {
    /// Non-hardened key
    Normal {
        /// Key index, within [0, 2^31 - 1]
        index: u32,
    },
    /// Hardened key
    Hardened {
        /// Key index, within [0, 2^31 - 1]
        index: u32,
    },
}

impl ChildNumber {
    const HARDENED_BIT: u32 = 1 << 31;

    /// Create a non-hardened child number, rejecting indexes with the top bit set.
    pub fn from_normal_idx(index: u32) -> Result<Self, Error> {
        if index & Self::HARDENED_BIT == 0 {
            Ok(ChildNumber::Normal { index })
        } else {
            Err(Error::InvalidChildNumber(index))
        }
    }

    /// Create a hardened child number, rejecting indexes with the top bit set.
    pub fn from_hardened_idx(index: u32) -> Result<Self, Error> {
        if index & Self::HARDENED_BIT == 0 {
            Ok(ChildNumber::Hardened { index })
        } else {
            Err(Error::InvalidChildNumber(index))
        }
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildNumber::Hardened { .. })
    }
}

impl From<u32> for ChildNumber {
    /// The top bit selects a hardened index.
    fn from(number: u32) -> Self {
        if number & ChildNumber::HARDENED_BIT != 0 {
            ChildNumber::Hardened {
                index: number ^ ChildNumber::HARDENED_BIT,
            }
        } else {
            ChildNumber::Normal { index: number }
        }
    }
}

impl From<ChildNumber> for u32 {
    fn from(cnum: ChildNumber) -> Self {
        match cnum {
            ChildNumber::Normal { index } => index,
            ChildNumber::Hardened { index } => index | ChildNumber::HARDENED_BIT,
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChildNumber::Hardened { index } => write!(f, "{}'", index),
            ChildNumber::Normal { index } => write!(f, "{}", index),
        }
    }
}

impl FromStr for ChildNumber {
    type Err = Error;

    /// Both `'` and `h` mark a hardened index.
    fn from_str(inp: &str) -> Result<ChildNumber, Error> {
        let is_hardened = inp.ends_with('\'') || inp.ends_with('h');
        let digits = if is_hardened {
            &inp[..inp.len() - 1]
        } else {
            inp
        };
        let index = digits
            .parse::<u32>()
            .map_err(|_| Error::InvalidChildNumberFormat)?;
        if is_hardened {
            ChildNumber::from_hardened_idx(index)
        } else {
            ChildNumber::from_normal_idx(index)
        }
    }
}

/// A BIP-32 derivation path.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// The empty path, referring to the master key.
    pub fn master() -> DerivationPath {
        DerivationPath(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[ChildNumber] {
        &self.0
    }

    /// A new path with `cn` appended.
    pub fn child(&self, cn: ChildNumber) -> DerivationPath {
        let mut path = self.0.clone();
        path.push(cn);
        DerivationPath(path)
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(numbers: Vec<ChildNumber>) -> Self {
        DerivationPath(numbers)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("m")?;
        for cn in self.0.iter() {
            write!(f, "/{}", cn)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<DerivationPath, Error> {
        let mut parts = path.split('/');
        if parts.next() != Some("m") {
            return Err(Error::InvalidDerivationPathFormat);
        }
        let numbers = parts
            .map(ChildNumber::from_str)
            .collect::<Result<Vec<ChildNumber>, Error>>()?;
        Ok(DerivationPath(numbers))
    }
}

impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DerivationPath::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// The master key fingerprint and derivation path of a key.
pub type KeySource = (Fingerprint, DerivationPath);

/// Extended public key
///
/// Signet and regtest share the testnet version bytes, so a key for either of them encodes, and
/// compares, as the testnet key. Decoding always reports [Network::Testnet] for those bytes.
#[derive(Copy, Clone, Debug)]
pub struct ExtendedPubKey {
    /// The network this key is to be used on
    pub network: Network,
    /// How many derivations this key is from the master (which is 0)
    pub depth: u8,
    /// Fingerprint of the parent key
    pub parent_fingerprint: Fingerprint,
    /// Child number of the key used to derive from parent (0 for master)
    pub child_number: ChildNumber,
    /// Public key
    pub public_key: secp256k1::PublicKey,
    /// Chain code
    pub chain_code: [u8; 32],
}

impl ExtendedPubKey {
    /// Size of the serialized form, without the base58 checksum.
    pub const SIZE: usize = 78;

    /// Decoding extended public key from binary data according to BIP 32
    pub fn decode(data: &[u8]) -> Result<ExtendedPubKey, Error> {
        if data.len() != Self::SIZE {
            return Err(Error::WrongExtendedKeyLength(data.len()));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[0..4]);
        let network = if version == Network::Bitcoin.xpub_version() {
            Network::Bitcoin
        } else if version == Network::Testnet.xpub_version() {
            Network::Testnet
        } else {
            return Err(Error::UnknownVersion(version));
        };
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut child = [0u8; 4];
        child.copy_from_slice(&data[9..13]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        Ok(ExtendedPubKey {
            network,
            depth: data[4],
            parent_fingerprint: Fingerprint(parent_fingerprint),
            child_number: ChildNumber::from(u32::from_be_bytes(child)),
            chain_code,
            public_key: secp256k1::PublicKey::from_slice(&data[45..78])?,
        })
    }

    /// Extended public key binary encoding according to BIP 32
    pub fn encode(&self) -> [u8; 78] {
        let mut ret = [0u8; 78];
        ret[0..4].copy_from_slice(&self.network.xpub_version());
        ret[4] = self.depth;
        ret[5..9].copy_from_slice(self.parent_fingerprint.as_bytes());
        ret[9..13].copy_from_slice(&u32::from(self.child_number).to_be_bytes());
        ret[13..45].copy_from_slice(&self.chain_code);
        ret[45..78].copy_from_slice(&self.public_key.serialize());
        ret
    }

    /// Returns the HASH160 of the public key.
    pub fn identifier(&self) -> Hash160 {
        Hash160::generate(&self.public_key.serialize())
    }

    /// Returns the first four bytes of the identifier
    pub fn fingerprint(&self) -> Fingerprint {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.identifier().hash[0..4]);
        Fingerprint(raw)
    }
}

// equality and ordering follow the 78-byte encoding, which is also the PSBT key
impl PartialEq for ExtendedPubKey {
    fn eq(&self, other: &Self) -> bool {
        self.encode() == other.encode()
    }
}

impl Eq for ExtendedPubKey {}

impl Ord for ExtendedPubKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.encode().cmp(&other.encode())
    }
}

impl PartialOrd for ExtendedPubKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::hash::Hash for ExtendedPubKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.encode().hash(state);
    }
}

impl fmt::Display for ExtendedPubKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&base58ck::encode_with_checksum(&self.encode()))
    }
}

impl FromStr for ExtendedPubKey {
    type Err = Error;

    fn from_str(inp: &str) -> Result<ExtendedPubKey, Error> {
        let data =
            base58ck::decode_with_checksum(inp).map_err(|e| Error::Base58(e.to_string()))?;
        ExtendedPubKey::decode(&data)
    }
}

impl Serialize for ExtendedPubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExtendedPubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ExtendedPubKey::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
