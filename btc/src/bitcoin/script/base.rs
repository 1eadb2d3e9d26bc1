use crate::bitcoin::script::opcodes::{self, Opcode};
use crate::bitcoin::script::{ScriptBuilder, WitnessVersion};
use crate::bitcoin::{varint_decode, varint_encode, varint_size, Encodable, Hash160, Sha256Hash};
use crate::{Error, Result};
use bytes::{Buf, BufMut};
use hex::{FromHex, ToHex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Bitcoin Scripts are used to lock and unlock outputs.
///
/// This struct is a Script in its encoded form and is read-only. Use [Script::instructions()]
/// to examine a script or [ScriptBuilder] to build a script.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct Script {
    pub raw: Vec<u8>,
}

impl Script {
    /// The empty script.
    pub fn new() -> Script {
        Script { raw: Vec::new() }
    }

    /// Length of the script in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Iterate over the instructions of the script.
    ///
    /// The iterator yields an error and then stops if a push runs past the end of the script.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            data: &self.raw,
            failed: false,
        }
    }

    /// Generates a P2PKH output script.
    pub fn new_p2pkh(pubkey_hash: &Hash160) -> Script {
        ScriptBuilder::new()
            .push_opcode(opcodes::OP_DUP)
            .push_opcode(opcodes::OP_HASH160)
            .push_slice(&pubkey_hash.hash)
            .push_opcode(opcodes::OP_EQUALVERIFY)
            .push_opcode(opcodes::OP_CHECKSIG)
            .build()
    }

    /// Generates a P2SH output script.
    pub fn new_p2sh(script_hash: &Hash160) -> Script {
        ScriptBuilder::new()
            .push_opcode(opcodes::OP_HASH160)
            .push_slice(&script_hash.hash)
            .push_opcode(opcodes::OP_EQUAL)
            .build()
    }

    /// Generates a P2WPKH output script.
    pub fn new_v0_p2wpkh(pubkey_hash: &Hash160) -> Script {
        Script::new_witness_program(WitnessVersion::V0, &pubkey_hash.hash)
    }

    /// Generates a P2WSH output script.
    pub fn new_v0_p2wsh(script_hash: &Sha256Hash) -> Script {
        Script::new_witness_program(WitnessVersion::V0, &script_hash.hash)
    }

    /// Generates a segwit output script: the version opcode followed by a single push.
    pub fn new_witness_program(version: WitnessVersion, program: &[u8]) -> Script {
        ScriptBuilder::new()
            .push_opcode(version.into_opcode())
            .push_slice(program)
            .build()
    }

    /// The P2SH output script that commits to this script.
    pub fn to_p2sh(&self) -> Script {
        Script::new_p2sh(&Hash160::generate(&self.raw))
    }

    /// The P2WSH output script that commits to this script.
    pub fn to_v0_p2wsh(&self) -> Script {
        Script::new_v0_p2wsh(&Sha256Hash::generate(&self.raw))
    }

    /// Checks whether a script pubkey is a P2PKH output.
    pub fn is_p2pkh(&self) -> bool {
        self.raw.len() == 25
            && self.raw[0] == opcodes::OP_DUP.to_u8()
            && self.raw[1] == opcodes::OP_HASH160.to_u8()
            && self.raw[2] == 20
            && self.raw[23] == opcodes::OP_EQUALVERIFY.to_u8()
            && self.raw[24] == opcodes::OP_CHECKSIG.to_u8()
    }

    /// Checks whether a script pubkey is a P2SH output.
    pub fn is_p2sh(&self) -> bool {
        self.raw.len() == 23
            && self.raw[0] == opcodes::OP_HASH160.to_u8()
            && self.raw[1] == 20
            && self.raw[22] == opcodes::OP_EQUAL.to_u8()
    }

    /// Checks whether a script pubkey is a segwit output: a version opcode followed by a direct
    /// push of 2 to 40 bytes.
    pub fn is_witness_program(&self) -> bool {
        let len = self.raw.len();
        if !(4..=42).contains(&len) {
            return false;
        }
        let version = Opcode::from(self.raw[0]);
        let push_len = self.raw[1] as usize;
        (version == opcodes::OP_0 || version.small_int().is_some())
            && (2..=40).contains(&push_len)
            && push_len + 2 == len
    }

    /// The witness version of a segwit output.
    pub fn witness_version(&self) -> Option<WitnessVersion> {
        if !self.is_witness_program() {
            return None;
        }
        WitnessVersion::from_opcode(Opcode::from(self.raw[0])).ok()
    }

    /// The witness program of a segwit output, without the version and push bytes.
    pub fn witness_program(&self) -> Option<&[u8]> {
        if self.is_witness_program() {
            Some(&self.raw[2..])
        } else {
            None
        }
    }

    /// Checks whether a script pubkey is a P2WPKH output.
    pub fn is_v0_p2wpkh(&self) -> bool {
        self.raw.len() == 22 && self.raw[0] == opcodes::OP_0.to_u8() && self.raw[1] == 20
    }

    /// Checks whether a script pubkey is a P2WSH output.
    pub fn is_v0_p2wsh(&self) -> bool {
        self.raw.len() == 34 && self.raw[0] == opcodes::OP_0.to_u8() && self.raw[1] == 32
    }

    /// Checks whether a script pubkey is a P2TR output.
    pub fn is_v1_p2tr(&self) -> bool {
        self.raw.len() == 34 && self.raw[0] == opcodes::OP_1.to_u8() && self.raw[1] == 32
    }

    /// Checks whether a script is provably unspendable.
    pub fn is_op_return(&self) -> bool {
        self.raw.first() == Some(&opcodes::OP_RETURN.to_u8())
    }
}

impl From<Vec<u8>> for Script {
    fn from(raw: Vec<u8>) -> Self {
        Script { raw }
    }
}

impl From<&[u8]> for Script {
    fn from(raw: &[u8]) -> Self {
        Script { raw: raw.to_vec() }
    }
}

impl From<Script> for Vec<u8> {
    fn from(script: Script) -> Self {
        script.raw
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.raw
    }
}

impl FromHex for Script {
    type Error = Error;

    /// Hex encoding is not prefixed by the length.
    fn from_hex<T: AsRef<[u8]>>(hex: T) -> Result<Self> {
        Ok(Script {
            raw: hex::decode(hex)?,
        })
    }
}

impl Encodable for Script {
    /// A script is always encoded with its size.
    fn from_binary(buffer: &mut dyn Buf) -> Result<Self>
    where
        Self: Sized,
    {
        let size = varint_decode(buffer)? as usize;
        if buffer.remaining() < size {
            return Err(Error::DataTooSmall);
        }
        let mut raw = vec![0u8; size];
        buffer.copy_to_slice(&mut raw);
        Ok(Script { raw })
    }

    fn to_binary(&self, buffer: &mut dyn BufMut) -> Result<()> {
        varint_encode(buffer, self.raw.len() as u64)?;
        buffer.put_slice(&self.raw);
        Ok(())
    }

    /// The size is the number of bytes plus the number of bytes needed to encode its size.
    fn encoded_size(&self) -> u64 {
        let l = self.raw.len() as u64;
        varint_size(l) + l
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.raw.encode_hex::<String>())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Script(")?;
        let mut first = true;
        for instruction in self.instructions() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match instruction {
                Ok(Instruction::Op(op)) => write!(f, "{:?}", op)?,
                Ok(Instruction::PushBytes(data)) => {
                    write!(f, "OP_PUSHBYTES_{} {}", data.len(), hex::encode(data))?
                }
                Err(_) => f.write_str("<push past end>")?,
            }
        }
        f.write_str(")")
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

/// A single script instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Push of the given bytes, including the empty push of `OP_0`.
    PushBytes(&'a [u8]),
    /// Any other opcode.
    Op(Opcode),
}

/// Iterator over the [Instruction]s of a [Script].
pub struct Instructions<'a> {
    data: &'a [u8],
    failed: bool,
}

impl<'a> Instructions<'a> {
    fn take_push(&mut self, header: usize, len: usize) -> Option<Result<Instruction<'a>>> {
        if self.data.len() < header + len {
            self.failed = true;
            return Some(Err(Error::BadData(format!(
                "script push of {} bytes runs past end of script",
                len
            ))));
        }
        let push = &self.data[header..header + len];
        self.data = &self.data[header + len..];
        Some(Ok(Instruction::PushBytes(push)))
    }

    fn push_len(&self, size: usize) -> Option<usize> {
        let bytes = self.data.get(1..1 + size)?;
        let mut len = 0usize;
        for (i, b) in bytes.iter().enumerate() {
            len |= (*b as usize) << (8 * i);
        }
        Some(len)
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.is_empty() {
            return None;
        }
        let op = Opcode::from(self.data[0]);
        let header_size = match op {
            opcodes::OP_PUSHDATA1 => 1,
            opcodes::OP_PUSHDATA2 => 2,
            opcodes::OP_PUSHDATA4 => 4,
            op if op.to_u8() < opcodes::OP_PUSHDATA1.to_u8() => {
                return self.take_push(1, op.to_u8() as usize);
            }
            op => {
                self.data = &self.data[1..];
                return Some(Ok(Instruction::Op(op)));
            }
        };
        match self.push_len(header_size) {
            Some(len) => self.take_push(1 + header_size, len),
            None => {
                self.failed = true;
                Some(Err(Error::BadData(
                    "script push length runs past end of script".to_string(),
                )))
            }
        }
    }
}
