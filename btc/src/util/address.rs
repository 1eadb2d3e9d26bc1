//! Bitcoin addresses.
//!
//! Base58 addresses for P2PKH and P2SH outputs, and bech32/bech32m addresses for segwit outputs.
//!
//! ```
//! use bitcoinlib::bitcoin::{Network, PrivateKey};
//! use bitcoinlib::util::address::Address;
//!
//! let key = PrivateKey::generate(Network::Bitcoin);
//! let address = Address::p2wpkh(&key.public_key(), Network::Bitcoin).unwrap();
//! assert!(address.to_string().starts_with("bc1q"));
//! ```

use crate::bitcoin::{
    base58ck, Hash160, Network, Opcode, PublicKey, Script, ScriptBuilder, Sha256Hash,
};
pub use crate::bitcoin::{WitnessVersion, WitnessVersionError};
use crate::util::taproot::{TapBranchHash, TapTweakHash};
use bech32::{FromBase32, ToBase32, Variant};
use secp256k1::{Scalar, Secp256k1, XOnlyPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Address error.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// The base58 string could not be decoded.
    Base58(String),
    /// The base58 checksum did not match.
    Base58Checksum,
    /// A base58 address must decode to a version byte and a 20-byte hash.
    InvalidBase58PayloadLength(usize),
    /// The base58 version byte is not one of the known P2PKH or P2SH prefixes.
    UnknownAddressVersion(u8),
    /// Bech32 encoding error
    Bech32(bech32::Error),
    /// The bech32 payload was empty
    EmptyBech32Payload,
    /// The checksum variant does not match the witness version.
    InvalidBech32Variant {
        /// The variant required by the witness version.
        expected: Variant,
        /// The variant of the checksum.
        found: Variant,
    },
    /// Script version must be 0 to 16 inclusive
    InvalidWitnessVersion(u8),
    /// Unable to parse witness version from string
    UnparsableWitnessVersion(ParseIntError),
    /// Bitcoin script opcode does not match any known witness version, the script is malformed
    MalformedWitnessVersion,
    /// The witness program must be between 2 and 40 bytes in length.
    InvalidWitnessProgramLength(usize),
    /// A v0 witness program must be either of length 20 or 32.
    InvalidSegwitV0ProgramLength(usize),
    /// An uncompressed pubkey was used where it is not allowed.
    UncompressedPubkey,
    /// The address type name was not recognized.
    UnknownAddressType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Base58(e) => write!(f, "base58: {}", e),
            Error::Base58Checksum => f.write_str("base58: checksum mismatch"),
            Error::InvalidBase58PayloadLength(l) => {
                write!(f, "base58 payload must be 21 bytes: length={}", l)
            }
            Error::UnknownAddressVersion(v) => write!(f, "unknown address version byte: {}", v),
            Error::Bech32(e) => write!(f, "bech32: {}", e),
            Error::EmptyBech32Payload => f.write_str("the bech32 payload was empty"),
            Error::InvalidBech32Variant { expected, found } => write!(
                f,
                "invalid bech32 checksum variant: expected {:?}, found {:?}",
                expected, found
            ),
            Error::InvalidWitnessVersion(v) => write!(f, "invalid witness script version: {}", v),
            Error::UnparsableWitnessVersion(e) => {
                write!(f, "incorrect format of a witness version byte: {}", e)
            }
            Error::MalformedWitnessVersion => f.write_str(
                "bitcoin script opcode does not match any known witness version, the script is malformed",
            ),
            Error::InvalidWitnessProgramLength(l) => write!(
                f,
                "the witness program must be between 2 and 40 bytes in length: length={}",
                l
            ),
            Error::InvalidSegwitV0ProgramLength(l) => write!(
                f,
                "a v0 witness program must be either of length 20 or 32 bytes: length={}",
                l
            ),
            Error::UncompressedPubkey => {
                f.write_str("an uncompressed pubkey was used where it is not allowed")
            }
            Error::UnknownAddressType(s) => write!(f, "unknown address type: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Bech32(e) => Some(e),
            Error::UnparsableWitnessVersion(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bech32::Error> for Error {
    fn from(e: bech32::Error) -> Error {
        Error::Bech32(e)
    }
}

impl From<WitnessVersionError> for Error {
    fn from(e: WitnessVersionError) -> Error {
        match e {
            WitnessVersionError::Invalid(v) => Error::InvalidWitnessVersion(v),
            WitnessVersionError::Unparsable(e) => Error::UnparsableWitnessVersion(e),
            WitnessVersionError::Malformed => Error::MalformedWitnessVersion,
        }
    }
}

/// The different types of addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressType {
    /// pay-to-pubkey-hash
    P2pkh,
    /// pay-to-script-hash
    P2sh,
    /// pay-to-witness-pubkey-hash
    P2wpkh,
    /// pay-to-witness-script-hash
    P2wsh,
    /// pay-to-taproot
    P2tr,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AddressType::P2pkh => "p2pkh",
            AddressType::P2sh => "p2sh",
            AddressType::P2wpkh => "p2wpkh",
            AddressType::P2wsh => "p2wsh",
            AddressType::P2tr => "p2tr",
        })
    }
}

impl FromStr for AddressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p2pkh" => Ok(AddressType::P2pkh),
            "p2sh" => Ok(AddressType::P2sh),
            "p2wpkh" => Ok(AddressType::P2wpkh),
            "p2wsh" => Ok(AddressType::P2wsh),
            "p2tr" => Ok(AddressType::P2tr),
            _ => Err(Error::UnknownAddressType(s.to_string())),
        }
    }
}

/// The method used to produce an address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Payload {
    /// P2PKH address
    PubkeyHash(Hash160),
    /// P2SH address
    ScriptHash(Hash160),
    /// Segwit addresses
    WitnessProgram {
        /// The witness program version
        version: WitnessVersion,
        /// The witness program
        program: Vec<u8>,
    },
}

impl Payload {
    /// Get a [Payload] from an output script (scriptPubkey).
    pub fn from_script(script: &Script) -> Option<Payload> {
        let bytes = script.as_bytes();
        Some(if script.is_p2pkh() {
            Payload::PubkeyHash(Hash160::from_slice(&bytes[3..23]).ok()?)
        } else if script.is_p2sh() {
            Payload::ScriptHash(Hash160::from_slice(&bytes[2..22]).ok()?)
        } else if script.is_witness_program() {
            Payload::WitnessProgram {
                version: WitnessVersion::from_opcode(Opcode::from(bytes[0])).ok()?,
                program: bytes[2..].to_vec(),
            }
        } else {
            return None;
        })
    }

    /// Generates a script pubkey spending to this [Payload].
    pub fn script_pubkey(&self) -> Script {
        match self {
            Payload::PubkeyHash(hash) => Script::new_p2pkh(hash),
            Payload::ScriptHash(hash) => Script::new_p2sh(hash),
            Payload::WitnessProgram { version, program } => {
                Script::new_witness_program(*version, program)
            }
        }
    }
}

/// A Bitcoin address
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    /// The type of the address
    pub payload: Payload,
    /// The network on which this address is usable
    pub network: Network,
}

impl Address {
    /// Creates a pay to public key hash address from a public key.
    ///
    /// The hash covers the key as serialized, so compressed and uncompressed forms of the same key
    /// give different addresses.
    pub fn p2pkh(pk: &PublicKey, network: Network) -> Address {
        Address {
            network,
            payload: Payload::PubkeyHash(pk.pubkey_hash()),
        }
    }

    /// Creates a pay to script hash P2SH address from a script.
    pub fn p2sh(script: &Script, network: Network) -> Address {
        Address {
            network,
            payload: Payload::ScriptHash(Hash160::generate(script.as_bytes())),
        }
    }

    /// Create a witness pay to public key address from a public key.
    ///
    /// Will only return an Error when an uncompressed public key is provided.
    pub fn p2wpkh(pk: &PublicKey, network: Network) -> Result<Address, Error> {
        let hash = pk.wpubkey_hash().ok_or(Error::UncompressedPubkey)?;
        Ok(Address {
            network,
            payload: Payload::WitnessProgram {
                version: WitnessVersion::V0,
                program: hash.hash.to_vec(),
            },
        })
    }

    /// Create a pay to script address that embeds a witness pay to public key.
    ///
    /// Will only return an Error when an uncompressed public key is provided.
    pub fn p2shwpkh(pk: &PublicKey, network: Network) -> Result<Address, Error> {
        let hash = pk.wpubkey_hash().ok_or(Error::UncompressedPubkey)?;
        let redeem = ScriptBuilder::new()
            .push_int(0)
            .push_slice(&hash.hash)
            .build();
        Ok(Address::p2sh(&redeem, network))
    }

    /// Create a witness pay to script hash address.
    pub fn p2wsh(script: &Script, network: Network) -> Address {
        Address {
            network,
            payload: Payload::WitnessProgram {
                version: WitnessVersion::V0,
                program: Sha256Hash::generate(script.as_bytes()).hash.to_vec(),
            },
        }
    }

    /// Create a pay to script address that embeds a witness pay to script hash address.
    pub fn p2shwsh(script: &Script, network: Network) -> Address {
        Address::p2sh(&script.to_v0_p2wsh(), network)
    }

    /// Create a pay to taproot address from an internal key and an optional script tree root.
    ///
    /// The output key is the internal key tweaked with [TapTweakHash::from_key_and_tweak()] as
    /// described in BIP341.
    pub fn p2tr(
        internal_key: XOnlyPublicKey,
        merkle_root: Option<TapBranchHash>,
        network: Network,
    ) -> crate::Result<Address> {
        let secp = Secp256k1::verification_only();
        let tweak = TapTweakHash::from_key_and_tweak(&internal_key, merkle_root);
        let scalar = Scalar::from_be_bytes(tweak.to_byte_array())
            .map_err(|_| secp256k1::Error::InvalidTweak)?;
        let (output_key, _parity) = internal_key.add_tweak(&secp, &scalar)?;
        Ok(Address {
            network,
            payload: Payload::WitnessProgram {
                version: WitnessVersion::V1,
                program: output_key.serialize().to_vec(),
            },
        })
    }

    /// Get the address type of the address.
    /// None if unknown, non-standard or related to a future witness version.
    pub fn address_type(&self) -> Option<AddressType> {
        match &self.payload {
            Payload::PubkeyHash(_) => Some(AddressType::P2pkh),
            Payload::ScriptHash(_) => Some(AddressType::P2sh),
            Payload::WitnessProgram { version, program } => match (version, program.len()) {
                (WitnessVersion::V0, 20) => Some(AddressType::P2wpkh),
                (WitnessVersion::V0, 32) => Some(AddressType::P2wsh),
                (WitnessVersion::V1, 32) => Some(AddressType::P2tr),
                _ => None,
            },
        }
    }

    /// Check whether or not the address is following Bitcoin standard rules.
    ///
    /// Segwit addresses with unassigned witness versions or non-standard program sizes are
    /// considered non-standard.
    pub fn is_standard(&self) -> bool {
        self.address_type().is_some()
    }

    /// Get an [Address] from an output script (scriptPubkey).
    pub fn from_script(script: &Script, network: Network) -> Option<Address> {
        Some(Address {
            payload: Payload::from_script(script)?,
            network,
        })
    }

    /// Generates a script pubkey spending to this address
    pub fn script_pubkey(&self) -> Script {
        self.payload.script_pubkey()
    }

    /// Creates a URI string *bitcoin:address* optimized to be encoded in QR codes.
    ///
    /// If the address is bech32, both the schema and the address become uppercase so the QR code
    /// can use alphanumeric mode. Base58 addresses are case sensitive and left as they are.
    pub fn to_qr_uri(&self) -> String {
        let schema = match self.payload {
            Payload::WitnessProgram { .. } => "BITCOIN",
            _ => "bitcoin",
        };
        format!("{}:{:#}", schema, self)
    }

    fn from_bech32(s: &str, network: Network) -> Result<Address, Error> {
        let (_, payload, variant) = bech32::decode(s)?;
        let (v, p5) = match payload.split_first() {
            Some(split) => split,
            None => return Err(Error::EmptyBech32Payload),
        };
        let version = WitnessVersion::from_u5(*v)?;
        let program = Vec::<u8>::from_base32(p5)?;

        if program.len() < 2 || program.len() > 40 {
            return Err(Error::InvalidWitnessProgramLength(program.len()));
        }
        if version == WitnessVersion::V0 && program.len() != 20 && program.len() != 32 {
            return Err(Error::InvalidSegwitV0ProgramLength(program.len()));
        }
        if variant != version.bech32_variant() {
            return Err(Error::InvalidBech32Variant {
                expected: version.bech32_variant(),
                found: variant,
            });
        }

        Ok(Address {
            payload: Payload::WitnessProgram { version, program },
            network,
        })
    }

    fn from_base58(s: &str) -> Result<Address, Error> {
        if s.len() > 50 {
            return Err(Error::InvalidBase58PayloadLength(s.len() * 11 / 15));
        }
        let data = base58ck::decode_with_checksum(s).map_err(|e| match e {
            crate::Error::ChecksumMismatch => Error::Base58Checksum,
            other => Error::Base58(other.to_string()),
        })?;
        if data.len() != 21 {
            return Err(Error::InvalidBase58PayloadLength(data.len()));
        }
        let (network, is_script) =
            Network::from_address_prefix(data[0]).ok_or(Error::UnknownAddressVersion(data[0]))?;
        let mut hash = Hash160::ZERO;
        hash.hash.copy_from_slice(&data[1..]);
        let payload = if is_script {
            Payload::ScriptHash(hash)
        } else {
            Payload::PubkeyHash(hash)
        };
        Ok(Address { network, payload })
    }
}

// Alternate formatting `{:#}` is used to return uppercase version of bech32 addresses which should
// be used in QR codes, see [Address::to_qr_uri]
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.payload {
            Payload::PubkeyHash(hash) => {
                let mut prefixed = [0; 21];
                prefixed[0] = self.network.p2pkh_prefix();
                prefixed[1..].copy_from_slice(&hash.hash);
                f.write_str(&base58ck::encode_with_checksum(&prefixed))
            }
            Payload::ScriptHash(hash) => {
                let mut prefixed = [0; 21];
                prefixed[0] = self.network.p2sh_prefix();
                prefixed[1..].copy_from_slice(&hash.hash);
                f.write_str(&base58ck::encode_with_checksum(&prefixed))
            }
            Payload::WitnessProgram { version, program } => {
                let mut data = vec![version.to_u5().map_err(|_| fmt::Error)?];
                data.extend(program.to_base32());
                let encoded = bech32::encode(self.network.bech32_hrp(), data, version.bech32_variant())
                    .map_err(|_| fmt::Error)?;
                if f.alternate() {
                    f.write_str(&encoded.to_ascii_uppercase())
                } else {
                    f.write_str(&encoded)
                }
            }
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Extract the bech32 prefix.
/// Returns the same slice when no prefix is found.
fn find_bech32_prefix(bech32: &str) -> &str {
    // Split at the last occurrence of the separator character '1'.
    match bech32.rfind('1') {
        None => bech32,
        Some(sep) => bech32.split_at(sep).0,
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Testnet and signet share their prefixes, an address for either network parses as
    /// [Network::Testnet].
    fn from_str(s: &str) -> Result<Address, Error> {
        match Network::from_bech32_hrp(find_bech32_prefix(s)) {
            Some(network) => Address::from_bech32(s, network),
            None => Address::from_base58(s),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitcoin::{opcodes, FromHex};
    use Network::{Bitcoin, Testnet};

    fn hex_key(hex: &str) -> PublicKey {
        PublicKey::from_str(hex).unwrap()
    }

    fn hex_script(hex: &str) -> Script {
        Script::from_hex(hex).unwrap()
    }

    fn roundtrips(addr: &Address) {
        assert_eq!(
            Address::from_str(&addr.to_string()).unwrap(),
            *addr,
            "string round-trip failed for {}",
            addr,
        );
        assert_eq!(
            Address::from_script(&addr.script_pubkey(), addr.network).as_ref(),
            Some(addr),
            "script round-trip failed for {}",
            addr,
        );
        let json = serde_json::to_string(addr).unwrap();
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), *addr);
    }

    #[test]
    fn test_p2pkh_address_58() {
        let addr = Address {
            network: Bitcoin,
            payload: Payload::PubkeyHash(
                Hash160::from_hex("162c5ea71c0b23f5b9022ef047c4a86470a5b070").unwrap(),
            ),
        };

        assert_eq!(
            addr.script_pubkey(),
            hex_script("76a914162c5ea71c0b23f5b9022ef047c4a86470a5b07088ac")
        );
        assert_eq!(&addr.to_string(), "132F25rTsvBdp9JzLLBHP5mvGY66i1xdiM");
        assert_eq!(addr.address_type(), Some(AddressType::P2pkh));
        roundtrips(&addr);
    }

    #[test]
    fn test_p2pkh_from_key() {
        let key = hex_key("048d5141948c1702e8c95f438815794b87f706a8d4cd2bffad1dc1570971032c9b6042a0431ded2478b5c9cf2d81c124a5e57347a3c63ef0e7716cf54d613ba183");
        let addr = Address::p2pkh(&key, Bitcoin);
        assert_eq!(&addr.to_string(), "1QJVDzdqb1VpbDK7uDeyVXy9mR27CJiyhY");

        let key = hex_key("03df154ebfcf29d29cc10d5c2565018bce2d9edbab267c31d2caf44a63056cf99f");
        let addr = Address::p2pkh(&key, Testnet);
        assert_eq!(&addr.to_string(), "mqkhEMH6NCeYjFybv7pvFC22MFeaNT9AQC");
        assert_eq!(addr.address_type(), Some(AddressType::P2pkh));
        roundtrips(&addr);
    }

    #[test]
    fn test_p2sh_address_58() {
        let addr = Address {
            network: Bitcoin,
            payload: Payload::ScriptHash(
                Hash160::from_hex("162c5ea71c0b23f5b9022ef047c4a86470a5b070").unwrap(),
            ),
        };

        assert_eq!(
            addr.script_pubkey(),
            hex_script("a914162c5ea71c0b23f5b9022ef047c4a86470a5b07087")
        );
        assert_eq!(&addr.to_string(), "33iFwdLuRpW1uK1RTRqsoi8rR4NpDzk66k");
        assert_eq!(addr.address_type(), Some(AddressType::P2sh));
        roundtrips(&addr);
    }

    #[test]
    fn test_p2sh_parse() {
        let script = hex_script("552103a765fc35b3f210b95223846b36ef62a4e53e34e2925270c2c7906b92c9f718eb2103c327511374246759ec8d0b89fa6c6b23b33e11f92c5bc155409d86de0c79180121038cae7406af1f12f4786d820a1466eec7bc5785a1b5e4a387eca6d797753ef6db2103252bfb9dcaab0cd00353f2ac328954d791270203d66c2be8b430f115f451b8a12103e79412d42372c55dd336f2eb6eb639ef9d74a22041ba79382c74da2338fe58ad21035049459a4ebc00e876a9eef02e72a3e70202d3d1f591fc0dd542f93f642021f82102016f682920d9723c61b27f562eb530c926c00106004798b6471e8c52c60ee02057ae");
        let addr = Address::p2sh(&script, Testnet);

        assert_eq!(&addr.to_string(), "2N3zXjbwdTcPsJiy8sUK9FhWJhqQCxA8Jjr");
        assert_eq!(addr.address_type(), Some(AddressType::P2sh));
        assert_eq!(addr.script_pubkey(), script.to_p2sh());
        roundtrips(&addr);
    }

    #[test]
    fn test_p2wpkh() {
        // from Bitcoin transaction b3c8c2b6cfc335abbcb2c7823a8453f55d64b2b5125a9a61e8737230cdb8ce20
        let mut key = hex_key("033bc8c83c52df5712229a2f72206d90192366c36428cb0c12b6af98324d97bfbc");
        let addr = Address::p2wpkh(&key, Bitcoin).unwrap();
        assert_eq!(&addr.to_string(), "bc1qvzvkjn4q3nszqxrv3nraga2r822xjty3ykvkuw");
        assert_eq!(addr.address_type(), Some(AddressType::P2wpkh));
        roundtrips(&addr);

        key.compressed = false;
        assert_eq!(Address::p2wpkh(&key, Bitcoin), Err(Error::UncompressedPubkey));
    }

    #[test]
    fn test_p2wsh() {
        // from Bitcoin transaction 5df912fda4becb1c29e928bec8d64d93e9ba8efa9b5b405bd683c86fd2c65667
        let script = hex_script("52210375e00eb72e29da82b89367947f29ef34afb75e8654f6ea368e0acdfd92976b7c2103a1b26313f430c4b15bb1fdce663207659d8cac749a0e53d70eff01874496feff2103c96d495bfdd5ba4145e3e046fee45e84a8a48ad05bd8dbb395c011a32cf9f88053ae");
        let addr = Address::p2wsh(&script, Bitcoin);
        assert_eq!(
            &addr.to_string(),
            "bc1qwqdg6squsna38e46795at95yu9atm8azzmyvckulcc7kytlcckxswvvzej"
        );
        assert_eq!(addr.address_type(), Some(AddressType::P2wsh));
        assert_eq!(addr.script_pubkey(), script.to_v0_p2wsh());
        roundtrips(&addr);
    }

    #[test]
    fn test_p2shwpkh() {
        // from Bitcoin transaction ad3fd9c6b52e752ba21425435ff3dd361d6ac271531fc1d2144843a9f550ad01
        let mut key = hex_key("026c468be64d22761c30cd2f12cbc7de255d592d7904b1bab07236897cc4c2e766");
        let addr = Address::p2shwpkh(&key, Bitcoin).unwrap();
        assert_eq!(&addr.to_string(), "3QBRmWNqqBGme9er7fMkGqtZtp4gjMFxhE");
        assert_eq!(addr.address_type(), Some(AddressType::P2sh));
        roundtrips(&addr);

        key.compressed = false;
        assert_eq!(Address::p2shwpkh(&key, Bitcoin), Err(Error::UncompressedPubkey));
    }

    #[test]
    fn test_p2shwsh() {
        // from Bitcoin transaction f9ee2be4df05041d0e0a35d7caa3157495ca4f93b233234c9967b6901dacf7a9
        let script = hex_script("522103e5529d8eaa3d559903adb2e881eb06c86ac2574ffa503c45f4e942e2a693b33e2102e5f10fcdcdbab211e0af6a481f5532536ec61a5fdbf7183770cf8680fe729d8152ae");
        let addr = Address::p2shwsh(&script, Bitcoin);
        assert_eq!(&addr.to_string(), "36EqgNnsWW94SreZgBWc1ANC6wpFZwirHr");
        assert_eq!(addr.address_type(), Some(AddressType::P2sh));
        roundtrips(&addr);
    }

    #[test]
    fn test_p2tr() {
        // BIP86 first receiving address of the test mnemonic
        let internal_key = XOnlyPublicKey::from_str(
            "cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115",
        )
        .unwrap();
        let addr = Address::p2tr(internal_key, None, Bitcoin).unwrap();
        assert_eq!(
            &addr.to_string(),
            "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr"
        );
        assert_eq!(addr.address_type(), Some(AddressType::P2tr));
        assert!(addr.script_pubkey().is_v1_p2tr());
        roundtrips(&addr);
    }

    #[test]
    fn test_non_existent_segwit_version() {
        // 40-byte program
        let program = Vec::from_hex(
            "654f6ea368e0acdfd92976b7c2103a1b26313f430654f6ea368e0acdfd92976b7c2103a1b26313f4",
        )
        .unwrap();
        let addr = Address {
            payload: Payload::WitnessProgram {
                version: WitnessVersion::V13,
                program,
            },
            network: Network::Bitcoin,
        };
        assert!(!addr.is_standard());
        roundtrips(&addr);
    }

    #[test]
    fn test_bip350_vectors() {
        let valid_vectors = [
            ("BC1QW508D6QEJXTDG4Y5R3ZARVARY0C5XW7KV8F3T4", "0014751e76e8199196d454941c45d1b3a323f1433bd6"),
            ("tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7", "00201863143c14c5166804bd19203356da136c985678cd4d27a1b8c6329604903262"),
            ("bc1pw508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7kt5nd6y", "5128751e76e8199196d454941c45d1b3a323f1433bd6751e76e8199196d454941c45d1b3a323f1433bd6"),
            ("BC1SW50QGDZ25J", "6002751e"),
            ("bc1zw508d6qejxtdg4y5r3zarvaryvaxxpcs", "5210751e76e8199196d454941c45d1b3a323"),
            ("tb1qqqqqp399et2xygdj5xreqhjjvcmzhxw4aywxecjdzew6hylgvsesrxh6hy", "0020000000c4a5cad46221b2a187905e5266362b99d5e91c6ce24d165dab93e86433"),
            ("bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0", "512079be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
        ];
        for (address, script) in &valid_vectors {
            let addr: Address = address.parse().unwrap();
            assert_eq!(&addr.script_pubkey().to_string(), script);
            roundtrips(&addr);
        }

        let invalid_vectors = [
            // bech32 checksums on v1+ programs, valid before BIP350
            "bc1pw508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7k7grplx",
            "BC1SW50QA3JX3S",
            "bc1zw508d6qejxtdg4y5r3zarvaryvg6kdaj",
            // bech32m checksum on a v0 program
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kemeawh",
            "tc1qw508d6qejxtdg4y5r3zarvary0c5xw7kg3g4ty",
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5",
            "BC13W508D6QEJXTDG4Y5R3ZARVARY0C5XW7KN40WF2",
            "bc1rw5uspcuh",
            "bc10w508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7kw5rljs90",
            "BC1QR508D6QEJXTDG4Y5R3ZARVARYV98GJ9P",
            "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sL5k7",
            "bc1gmk9yu",
        ];
        for vector in &invalid_vectors {
            assert!(vector.parse::<Address>().is_err(), "{} should not parse", vector);
        }
    }

    #[test]
    fn test_variant_mismatch_error() {
        let r = Address::from_str(
            "bc1pw508d6qejxtdg4y5r3zarvary0c5xw7kw508d6qejxtdg4y5r3zarvary0c5xw7k7grplx",
        );
        assert_eq!(
            r,
            Err(Error::InvalidBech32Variant {
                expected: Variant::Bech32m,
                found: Variant::Bech32,
            })
        );
    }

    #[test]
    fn test_base58_errors() {
        // valid checksum, unknown version byte 0x30
        let s = base58ck::encode_with_checksum(&[0x30; 21]);
        assert_eq!(Address::from_str(&s), Err(Error::UnknownAddressVersion(0x30)));
        let s = base58ck::encode_with_checksum(&[0x00; 20]);
        assert_eq!(Address::from_str(&s), Err(Error::InvalidBase58PayloadLength(20)));
        assert_eq!(
            Address::from_str("132F25rTsvBdp9JzLLBHP5mvGY66i1xdiN"),
            Err(Error::Base58Checksum)
        );
        assert!(matches!(Address::from_str("0OIl"), Err(Error::Base58(_))));
    }

    #[test]
    fn test_regtest_and_json() {
        let addr = Address::from_str("bcrt1q2nfxmhd4n3c8834pj72xagvyr9gl57n5r94fsl").unwrap();
        assert_eq!(addr.network, Network::Regtest);
        assert_eq!(
            addr.script_pubkey(),
            hex_script("001454d26dddb59c7073c6a197946ea1841951fa7a74")
        );
        let json = serde_json::to_value(&addr).unwrap();
        assert_eq!(
            json,
            serde_json::Value::String("bcrt1q2nfxmhd4n3c8834pj72xagvyr9gl57n5r94fsl".to_owned())
        );
    }

    #[test]
    fn test_qr_string() {
        for el in ["132F25rTsvBdp9JzLLBHP5mvGY66i1xdiM", "33iFwdLuRpW1uK1RTRqsoi8rR4NpDzk66k"] {
            let addr = Address::from_str(el).unwrap();
            assert_eq!(addr.to_qr_uri(), format!("bitcoin:{}", el));
        }

        for el in [
            "bcrt1q2nfxmhd4n3c8834pj72xagvyr9gl57n5r94fsl",
            "bc1qwqdg6squsna38e46795at95yu9atm8azzmyvckulcc7kytlcckxswvvzej",
        ] {
            let addr = Address::from_str(el).unwrap();
            assert_eq!(addr.to_qr_uri(), format!("BITCOIN:{}", el.to_ascii_uppercase()));
        }
    }

    #[test]
    fn test_address_type_and_witness_version_errors() {
        assert_eq!(
            Error::from(WitnessVersion::from_num(17).unwrap_err()),
            Error::InvalidWitnessVersion(17)
        );
        assert_eq!(
            Error::from(WitnessVersion::from_opcode(opcodes::OP_DUP).unwrap_err()),
            Error::MalformedWitnessVersion
        );
        assert_eq!(AddressType::from_str("p2tr"), Ok(AddressType::P2tr));
        assert!(AddressType::from_str("p2pk").is_err());
    }
}
