//! Bitcoin library for Rust.
//!
//! Provides the Bitcoin primitives needed to work with addresses, taproot tagged hashes and
//! partially signed transactions (BIP174). It is not intended to be a wallet or a node.

/// Contains the core Bitcoin primitives. Hashes, Scripts, Transactions, Keys, etc.
pub mod bitcoin;

/// Contains functionality built on the core primitives: addresses, taproot, BIP32 key sources
/// and partially signed transactions.
pub mod util;

mod result;
pub use result::{Error, Result};

// re-export the secp256k1 crate
pub extern crate secp256k1;
