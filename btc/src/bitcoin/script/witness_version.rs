use crate::bitcoin::script::opcodes::{self, Opcode};
use crate::bitcoin::script::Instruction;
use bech32::Variant;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Error converting a number, string or opcode to a [WitnessVersion].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum WitnessVersionError {
    /// Script version must be 0 to 16 inclusive
    Invalid(u8),
    /// Unable to parse witness version from string
    Unparsable(ParseIntError),
    /// Bitcoin script opcode does not match any known witness version, the script is malformed
    Malformed,
}

impl fmt::Display for WitnessVersionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WitnessVersionError::Invalid(v) => write!(f, "invalid witness script version: {}", v),
            WitnessVersionError::Unparsable(e) => {
                write!(f, "incorrect format of a witness version byte: {}", e)
            }
            WitnessVersionError::Malformed => f.write_str(
                "bitcoin script opcode does not match any known witness version, the script is malformed",
            ),
        }
    }
}

impl std::error::Error for WitnessVersionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WitnessVersionError::Unparsable(e) => Some(e),
            _ => None,
        }
    }
}

/// Version of a witness program, the first opcode of a segwit output script.
///
/// Only `OP_0` and `OP_1` through `OP_16` are witness versions, so the enum has exactly 17
/// variants.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum WitnessVersion {
    /// Used for P2WPKH and P2WSH outputs
    V0 = 0,
    /// Used for P2TR outputs
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
    V5 = 5,
    V6 = 6,
    V7 = 7,
    V8 = 8,
    V9 = 9,
    V10 = 10,
    V11 = 11,
    V12 = 12,
    V13 = 13,
    V14 = 14,
    V15 = 15,
    V16 = 16,
}

impl WitnessVersion {
    const ALL: [WitnessVersion; 17] = [
        WitnessVersion::V0,
        WitnessVersion::V1,
        WitnessVersion::V2,
        WitnessVersion::V3,
        WitnessVersion::V4,
        WitnessVersion::V5,
        WitnessVersion::V6,
        WitnessVersion::V7,
        WitnessVersion::V8,
        WitnessVersion::V9,
        WitnessVersion::V10,
        WitnessVersion::V11,
        WitnessVersion::V12,
        WitnessVersion::V13,
        WitnessVersion::V14,
        WitnessVersion::V15,
        WitnessVersion::V16,
    ];

    /// Converts a version number into a [WitnessVersion].
    pub fn from_num(no: u8) -> Result<Self, WitnessVersionError> {
        WitnessVersion::ALL
            .get(no as usize)
            .copied()
            .ok_or(WitnessVersionError::Invalid(no))
    }

    /// Converts the first 5-bit symbol of a bech32 payload.
    pub fn from_u5(value: bech32::u5) -> Result<Self, WitnessVersionError> {
        WitnessVersion::from_num(value.to_u8())
    }

    /// Converts a script opcode, `OP_0` to `OP_16`.
    pub fn from_opcode(opcode: Opcode) -> Result<Self, WitnessVersionError> {
        if opcode == opcodes::OP_0 {
            return Ok(WitnessVersion::V0);
        }
        match opcode.small_int() {
            Some(n) => WitnessVersion::from_num(n),
            None => Err(WitnessVersionError::Malformed),
        }
    }

    /// Converts a parsed script instruction. An empty push is version 0.
    pub fn from_instruction(instruction: Instruction) -> Result<Self, WitnessVersionError> {
        match instruction {
            Instruction::Op(op) => WitnessVersion::from_opcode(op),
            Instruction::PushBytes(bytes) if bytes.is_empty() => Ok(WitnessVersion::V0),
            Instruction::PushBytes(_) => Err(WitnessVersionError::Malformed),
        }
    }

    /// The version number. This is not the opcode byte; use [WitnessVersion::into_opcode()]
    /// for that.
    pub fn to_num(self) -> u8 {
        self as u8
    }

    /// The opcode that starts an output script of this version.
    pub fn into_opcode(self) -> Opcode {
        match Opcode::from_small_int(self.to_num()) {
            Some(op) => op,
            None => opcodes::OP_0,
        }
    }

    /// The bech32 checksum variant for addresses of this version: bech32 for version 0 and
    /// bech32m for everything after it (BIP350).
    pub fn bech32_variant(self) -> Variant {
        match self {
            WitnessVersion::V0 => Variant::Bech32,
            _ => Variant::Bech32m,
        }
    }

    pub(crate) fn to_u5(self) -> Result<bech32::u5, bech32::Error> {
        bech32::u5::try_from_u8(self.to_num())
    }
}

impl fmt::Display for WitnessVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_num())
    }
}

impl FromStr for WitnessVersion {
    type Err = WitnessVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = u8::from_str(s).map_err(WitnessVersionError::Unparsable)?;
        WitnessVersion::from_num(version)
    }
}
