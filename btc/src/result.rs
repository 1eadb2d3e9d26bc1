use crate::util::{address, bip32, psbt};
use base58::FromBase58Error;
use bytes::TryGetError;
use hex::FromHexError;

/// Standard Result used in the library
pub type Result<T> = std::result::Result<T, Error>;

/// Standard error type used in the library
#[derive(Debug)]
pub enum Error {
    /// An argument provided is invalid
    BadArgument(String),
    /// The data provided is invalid
    BadData(String),
    /// The data did not match the checksum.
    ChecksumMismatch,
    /// The WIF provided has an invalid length.
    InvalidWifLength(usize),
    /// The network specifier was not recognized.
    InvalidNetworkSpecifier(String),
    /// The data provided is too small to perform the operation.
    DataTooSmall,
    /// Hex string could not be decoded
    FromHexError(FromHexError),
    /// Base58 string could not be decoded
    FromBase58Error(FromBase58Error),
    /// Base64 string could not be decoded
    Base64Error(base64::DecodeError),
    /// secp256k1 library error
    Secp256k1Error(secp256k1::Error),
    /// Error from TryGet
    TryGet(TryGetError),
    /// Address error
    Address(address::Error),
    /// BIP32 error
    Bip32(bip32::Error),
    /// Partially signed transaction error
    Psbt(psbt::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadArgument(s) => f.write_str(&format!("Bad argument: {}", s)),
            Error::BadData(s) => f.write_str(&format!("Bad data: {}", s)),
            Error::ChecksumMismatch => f.write_str("Checksum mismatch"),
            Error::InvalidWifLength(l) => f.write_str(&format!("Invalid WIF length: {}", l)),
            Error::InvalidNetworkSpecifier(s) => f.write_str(&format!("Unknown network: {}", s)),
            Error::DataTooSmall => f.write_str("data too small"),
            Error::FromHexError(e) => f.write_str(&format!("Hex decoding error: {}", e)),
            Error::FromBase58Error(e) => f.write_str(&format!("Base58 decoding error: {:?}", e)),
            Error::Base64Error(e) => f.write_str(&format!("Base64 decoding error: {}", e)),
            Error::Secp256k1Error(e) => f.write_str(&format!("secpk256k1 error: {:?}", e)),
            Error::TryGet(e) => f.write_str(&format!("Tryget error: {}", e)),
            Error::Address(e) => f.write_str(&format!("Address error: {}", e)),
            Error::Bip32(e) => f.write_str(&format!("BIP32 error: {}", e)),
            Error::Psbt(e) => f.write_str(&format!("PSBT error: {}", e)),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FromHexError(e) => Some(e),
            Error::Base64Error(e) => Some(e),
            Error::Secp256k1Error(e) => Some(e),
            Error::TryGet(e) => Some(e),
            Error::Address(e) => Some(e),
            Error::Bip32(e) => Some(e),
            Error::Psbt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FromHexError> for Error {
    fn from(e: FromHexError) -> Self {
        Error::FromHexError(e)
    }
}

impl From<FromBase58Error> for Error {
    fn from(e: FromBase58Error) -> Self {
        Error::FromBase58Error(e)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Base64Error(e)
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Secp256k1Error(e)
    }
}

impl From<TryGetError> for Error {
    fn from(e: TryGetError) -> Self {
        Error::TryGet(e)
    }
}

impl From<address::Error> for Error {
    fn from(e: address::Error) -> Self {
        Error::Address(e)
    }
}

impl From<bip32::Error> for Error {
    fn from(e: bip32::Error) -> Self {
        Error::Bip32(e)
    }
}

impl From<psbt::Error> for Error {
    fn from(e: psbt::Error) -> Self {
        Error::Psbt(e)
    }
}
