//! Taproot tagged hashes.
//!
//! BIP340 defines a tagged hash as `SHA256(SHA256(tag) || SHA256(tag) || msg)`. Each tag gets its
//! own type so that a leaf hash can not be passed where a branch hash is expected.
//!
//! Like [struct@crate::bitcoin::Hash], the hex form of a tagged hash is byte-reversed, which is
//! how Bitcoin Core prints them.

use crate::bitcoin::{varint_encode, FromHex, Script};
use crate::Error;
use ring::digest::{digest, Context, SHA256};
use secp256k1::XOnlyPublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The leaf version of tapscript leaves.
pub const LEAF_VERSION_TAPSCRIPT: u8 = 0xc0;

macro_rules! tagged_hash {
    ($name:ident, $tag:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            raw: [u8; 32],
        }

        impl $name {
            /// The tag, as used in the hash prefix.
            pub const TAG: &'static str = $tag;

            /// A SHA-256 context with the tag prefix already written.
            pub fn engine() -> Context {
                let tag_hash = digest(&SHA256, Self::TAG.as_bytes());
                let mut engine = Context::new(&SHA256);
                engine.update(tag_hash.as_ref());
                engine.update(tag_hash.as_ref());
                engine
            }

            /// Finish a context obtained from [Self::engine()].
            pub fn from_engine(engine: Context) -> Self {
                let mut raw = [0u8; 32];
                raw.copy_from_slice(engine.finish().as_ref());
                $name { raw }
            }

            /// Hash the message with the tag.
            pub fn hash(msg: &[u8]) -> Self {
                let mut engine = Self::engine();
                engine.update(msg);
                Self::from_engine(engine)
            }

            /// Wrap an existing hash, given in digest byte order.
            pub fn from_byte_array(raw: [u8; 32]) -> Self {
                $name { raw }
            }

            pub fn from_slice(slice: &[u8]) -> crate::Result<Self> {
                let raw = <[u8; 32]>::try_from(slice).map_err(|_| {
                    Error::BadArgument(format!("{} must be 32 bytes, got {}", $tag, slice.len()))
                })?;
                Ok($name { raw })
            }

            /// The hash in digest byte order.
            pub fn to_byte_array(self) -> [u8; 32] {
                self.raw
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.raw
            }
        }

        impl FromHex for $name {
            type Error = Error;

            fn from_hex<T: AsRef<[u8]>>(hex: T) -> crate::Result<Self> {
                let mut raw = <[u8; 32]>::from_hex(hex)?;
                raw.reverse();
                Ok($name { raw })
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                let mut reversed = self.raw;
                reversed.reverse();
                f.write_str(&hex::encode(reversed))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
            }
        }
    };
}

tagged_hash!(TapLeafHash, "TapLeaf", "Tagged hash of a script tree leaf.");
tagged_hash!(TapBranchHash, "TapBranch", "Tagged hash of a script tree branch.");
tagged_hash!(TapTweakHash, "TapTweak", "Tagged hash used to tweak an internal key.");
tagged_hash!(TapSighashHash, "TapSighash", "Tagged hash of a taproot signature message.");

impl TapLeafHash {
    /// The leaf hash of a script: the leaf version followed by the length-prefixed script.
    pub fn from_script(script: &Script, leaf_version: u8) -> TapLeafHash {
        let mut data = Vec::with_capacity(script.len() + 10);
        data.push(leaf_version);
        // writing to a vec does not fail
        let _ = varint_encode(&mut data, script.len() as u64);
        data.extend_from_slice(script.as_bytes());
        TapLeafHash::hash(&data)
    }
}

impl TapBranchHash {
    /// Combine two child node hashes. The children are sorted so the result does not depend on
    /// their order.
    pub fn from_node_hashes(a: &[u8; 32], b: &[u8; 32]) -> TapBranchHash {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let mut engine = TapBranchHash::engine();
        engine.update(first);
        engine.update(second);
        TapBranchHash::from_engine(engine)
    }
}

impl From<TapLeafHash> for TapBranchHash {
    /// A tree with a single leaf has the leaf hash as its root.
    fn from(leaf: TapLeafHash) -> Self {
        TapBranchHash::from_byte_array(leaf.to_byte_array())
    }
}

impl TapTweakHash {
    /// The tweak committing an internal key to an optional script tree root.
    pub fn from_key_and_tweak(
        internal_key: &XOnlyPublicKey,
        merkle_root: Option<TapBranchHash>,
    ) -> TapTweakHash {
        let mut engine = TapTweakHash::engine();
        engine.update(&internal_key.serialize());
        if let Some(root) = merkle_root {
            engine.update(root.as_bytes());
        }
        TapTweakHash::from_engine(engine)
    }
}
