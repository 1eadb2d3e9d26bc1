use crate::bitcoin::{base58ck, Hash160, Network};
use crate::{Error, Result};
use hex::ToHex;
use secp256k1::Secp256k1;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A Bitcoin private key.
///
/// This is a wrapper around [secp256k1::SecretKey], providing some Bitcoin specific functionality.
/// The key remembers the network it was created for and whether the corresponding public key
/// should be serialized in compressed form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    /// Whether the public key is serialized compressed.
    pub compressed: bool,
    /// The network for which this key is to be used.
    pub network: Network,
    /// The actual ECDSA key.
    pub inner: secp256k1::SecretKey,
}

impl PrivateKey {
    /// Constructs new compressed ECDSA private key using the secp256k1 algorithm and
    /// a secure random number generator.
    pub fn generate(network: Network) -> PrivateKey {
        let secret_key = secp256k1::SecretKey::new(&mut rand::thread_rng());
        PrivateKey::new(secret_key, network)
    }

    /// Constructs a compressed private key from the provided generic Secp256k1 private key.
    pub fn new(key: secp256k1::SecretKey, network: Network) -> PrivateKey {
        PrivateKey {
            compressed: true,
            network,
            inner: key,
        }
    }

    /// Serializes the private key to bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        self.inner.secret_bytes().to_vec()
    }

    /// Deserializes a compressed private key from a slice.
    pub fn from_slice(data: &[u8], network: Network) -> Result<PrivateKey> {
        Ok(PrivateKey::new(
            secp256k1::SecretKey::from_slice(data)?,
            network,
        ))
    }

    /// Gets the public key corresponding to this private key.
    pub fn public_key(&self) -> PublicKey {
        let secp = Secp256k1::new();
        PublicKey {
            compressed: self.compressed,
            inner: secp256k1::PublicKey::from_secret_key(&secp, &self.inner),
        }
    }

    /// Gets the WIF encoding of this private key.
    pub fn to_wif(&self) -> String {
        let mut ret = Vec::with_capacity(34);
        ret.push(self.network.wif_prefix());
        ret.extend_from_slice(&self.inner.secret_bytes());
        if self.compressed {
            ret.push(1);
        }
        base58ck::encode_with_checksum(&ret)
    }

    /// Parses the WIF encoded private key.
    ///
    /// Note that the function can not distinguish between the non-production networks so any
    /// test network key is reported as [Network::Testnet].
    pub fn from_wif(wif: &str) -> Result<PrivateKey> {
        let data = base58ck::decode_with_checksum(wif)?;

        let compressed = match data.len() {
            33 => false,
            34 => true,
            other => {
                return Err(Error::InvalidWifLength(other));
            }
        };

        let network = match data[0] {
            0x80 => Network::Bitcoin,
            0xef => Network::Testnet,
            other => {
                return Err(Error::InvalidNetworkSpecifier(format!("wif prefix {:#04x}", other)));
            }
        };

        Ok(PrivateKey {
            compressed,
            network,
            inner: secp256k1::SecretKey::from_slice(&data[1..33])?,
        })
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PrivateKey::from_wif(s)
    }
}

/// A Bitcoin ECDSA public key.
///
/// The key may be serialized in compressed (33 bytes) or uncompressed (65 bytes) form. Segwit
/// outputs only accept compressed keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    /// Whether this public key should be serialized as compressed.
    pub compressed: bool,
    /// The actual ECDSA key.
    pub inner: secp256k1::PublicKey,
}

impl PublicKey {
    /// Constructs compressed ECDSA public key from anything that can be converted into a Secp256k1
    /// public key.
    pub fn new(key: impl Into<secp256k1::PublicKey>) -> PublicKey {
        PublicKey {
            compressed: true,
            inner: key.into(),
        }
    }

    /// Deserialize a public key from a slice, either 33 bytes compressed or 65 bytes uncompressed.
    pub fn from_slice(data: &[u8]) -> Result<PublicKey> {
        let compressed = match data.len() {
            33 => true,
            65 => false,
            len => {
                return Err(Error::BadData(format!(
                    "public key must be 33 or 65 bytes, got {}",
                    len
                )))
            }
        };
        Ok(PublicKey {
            compressed,
            inner: secp256k1::PublicKey::from_slice(data)?,
        })
    }

    /// Returns bitcoin 160-bit hash of the public key.
    pub fn pubkey_hash(&self) -> Hash160 {
        Hash160::generate(&self.to_bytes())
    }

    /// Returns the 160-bit hash used in a segwit v0 output, which requires a compressed key.
    pub fn wpubkey_hash(&self) -> Option<Hash160> {
        if self.compressed {
            Some(Hash160::generate(&self.inner.serialize()))
        } else {
            None
        }
    }

    /// Serializes the public key to bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        if self.compressed {
            self.inner.serialize().to_vec()
        } else {
            self.inner.serialize_uncompressed().to_vec()
        }
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(pk: secp256k1::PublicKey) -> PublicKey {
        PublicKey::new(pk)
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(value: &PrivateKey) -> Self {
        value.public_key()
    }
}

impl Ord for PublicKey {
    /// Public keys are ordered by their serialized form.
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    /// Decode a public key from the hex representation as included in a script and used by
    /// OP_CHECKSIG (e.g. from a P2PKH output script).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PublicKey::from_slice(&hex::decode(s)?)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_bytes().encode_hex::<String>())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
