//! Single-round digests.
//!
//! These appear as hash-lock preimage keys in partially signed transactions and as the
//! witness program of P2WSH outputs. Their hex form is the digest order, not reversed.

use crate::Error;
use hex::{FromHex, ToHex};
use ring::digest::{digest, SHA256};
use ripemd::digest::Update;
use ripemd::{Digest, Ripemd160};
use std::fmt;

/// A single SHA-256 digest.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha256Hash {
    pub hash: [u8; 32],
}

impl Sha256Hash {
    pub const SIZE: usize = 32;

    /// Hash the given data.
    pub fn generate(data: &[u8]) -> Sha256Hash {
        let d = digest(&SHA256, data);
        let mut hash = [0; Self::SIZE];
        hash.copy_from_slice(d.as_ref());
        Sha256Hash { hash }
    }

    /// Create a digest from a slice of exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> crate::Result<Sha256Hash> {
        let hash = <[u8; Self::SIZE]>::try_from(slice).map_err(|_| {
            Error::BadArgument(format!("sha256 must be 32 bytes, got {}", slice.len()))
        })?;
        Ok(Sha256Hash { hash })
    }
}

/// A single RIPEMD-160 digest.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ripemd160Hash {
    pub hash: [u8; 20],
}

impl Ripemd160Hash {
    pub const SIZE: usize = 20;

    /// Hash the given data.
    pub fn generate(data: &[u8]) -> Ripemd160Hash {
        let mut hasher = Ripemd160::new();
        Update::update(&mut hasher, data);
        let mut hash = [0; Self::SIZE];
        hash.copy_from_slice(hasher.finalize().as_ref());
        Ripemd160Hash { hash }
    }

    /// Create a digest from a slice of exactly 20 bytes.
    pub fn from_slice(slice: &[u8]) -> crate::Result<Ripemd160Hash> {
        let hash = <[u8; Self::SIZE]>::try_from(slice).map_err(|_| {
            Error::BadArgument(format!("ripemd160 must be 20 bytes, got {}", slice.len()))
        })?;
        Ok(Ripemd160Hash { hash })
    }
}

macro_rules! impl_digest_fmt {
    ($ty:ident) => {
        impl FromHex for $ty {
            type Error = Error;

            fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self, Self::Error> {
                let bytes = hex::decode(hex)?;
                Self::from_slice(&bytes)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&self.hash.encode_hex::<String>())
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&self.hash.encode_hex::<String>())
            }
        }
    };
}

impl_digest_fmt!(Sha256Hash);
impl_digest_fmt!(Ripemd160Hash);
