use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The signature hash type appended to a signature, selecting which parts of the transaction
/// it commits to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SigHashType {
    /// Sign all inputs and outputs (default)
    All = 0x01,
    /// Sign all inputs, but no outputs
    None = 0x02,
    /// Sign all inputs and the output with the same index
    Single = 0x03,
    /// Sign only this input and all outputs
    AllPlusAnyoneCanPay = 0x81,
    /// Sign only this input and no outputs
    NonePlusAnyoneCanPay = 0x82,
    /// Sign only this input and the output with the same index
    SinglePlusAnyoneCanPay = 0x83,
}

impl SigHashType {
    /// Parse one of the six standard values. Any other value is rejected, including ones that
    /// consensus would accept by masking.
    pub fn from_standard(n: u32) -> Option<SigHashType> {
        match n {
            0x01 => Some(SigHashType::All),
            0x02 => Some(SigHashType::None),
            0x03 => Some(SigHashType::Single),
            0x81 => Some(SigHashType::AllPlusAnyoneCanPay),
            0x82 => Some(SigHashType::NonePlusAnyoneCanPay),
            0x83 => Some(SigHashType::SinglePlusAnyoneCanPay),
            _ => None,
        }
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    pub fn anyone_can_pay(self) -> bool {
        self.to_u32() & 0x80 != 0
    }
}

impl Default for SigHashType {
    fn default() -> Self {
        SigHashType::All
    }
}

impl fmt::Display for SigHashType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SigHashType::All => "SIGHASH_ALL",
            SigHashType::None => "SIGHASH_NONE",
            SigHashType::Single => "SIGHASH_SINGLE",
            SigHashType::AllPlusAnyoneCanPay => "SIGHASH_ALL|SIGHASH_ANYONECANPAY",
            SigHashType::NonePlusAnyoneCanPay => "SIGHASH_NONE|SIGHASH_ANYONECANPAY",
            SigHashType::SinglePlusAnyoneCanPay => "SIGHASH_SINGLE|SIGHASH_ANYONECANPAY",
        })
    }
}

impl FromStr for SigHashType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIGHASH_ALL" => Ok(SigHashType::All),
            "SIGHASH_NONE" => Ok(SigHashType::None),
            "SIGHASH_SINGLE" => Ok(SigHashType::Single),
            "SIGHASH_ALL|SIGHASH_ANYONECANPAY" => Ok(SigHashType::AllPlusAnyoneCanPay),
            "SIGHASH_NONE|SIGHASH_ANYONECANPAY" => Ok(SigHashType::NonePlusAnyoneCanPay),
            "SIGHASH_SINGLE|SIGHASH_ANYONECANPAY" => Ok(SigHashType::SinglePlusAnyoneCanPay),
            _ => Err(Error::BadArgument(format!("unknown sighash type: {}", s))),
        }
    }
}
