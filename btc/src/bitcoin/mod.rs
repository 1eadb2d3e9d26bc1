/// The bitcoin module contains the core bitcoin types and configuration.

pub mod base58ck;
mod crypto;
mod digests;
mod encoding;
pub mod hash;
mod hash160;
mod network;
mod script;
mod sighash;
mod tx;
mod var_int;


pub use self::crypto::{PrivateKey, PublicKey};
pub use self::digests::{Ripemd160Hash, Sha256Hash};
pub use self::encoding::Encodable;
pub use self::hash::Hash;
pub use self::hash160::Hash160;
pub use self::network::Network;
pub use self::script::{
    opcodes, Instruction, Instructions, Opcode, Script, ScriptBuilder, WitnessVersion,
    WitnessVersionError,
};
pub use self::sighash::SigHashType;
pub use self::tx::{Outpoint, Tx, TxHash, TxInput, TxOutput};
pub(crate) use self::tx::{decode_witness, encode_witness};
pub use self::var_int::{varint_decode, varint_encode, varint_size};
pub use hex::{FromHex, ToHex};
