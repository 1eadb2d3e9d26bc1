use crate::bitcoin::Hash;
use crate::{Error, Result};
use base58::{FromBase58, ToBase58};

/// Functions for base-58 encoding with checksum.
///
/// Some Bitcoin standards use base-58 encoding with an additional checksum. The checksum
/// is appended to the end of the base-58 encoding and consists of the first 4 bytes of
/// the SHA256D hash of the value.

/// Encodes `data` as a base58 string including the checksum.
///
/// The checksum is the first four bytes of the sha256d of the data and is concatenated onto the end.
pub fn encode_with_checksum(data: &[u8]) -> String {
    let checksum = Hash::sha256d(data);
    let mut ck_data = Vec::with_capacity(data.len() + 4);
    ck_data.extend_from_slice(data);
    ck_data.extend_from_slice(&checksum.raw[0..4]);
    ck_data.to_base58()
}

/// Decode from base58 with checksum, verifying and removing the checksum.
///
/// The checksum is the first four bytes of the sha256d of the data and is concatenated onto the end
/// of the base58 encoding.
pub fn decode_with_checksum(encoded: &str) -> Result<Vec<u8>> {
    let mut data = encoded.from_base58()?;
    let l = data.len();
    if l < 5 {
        Err(Error::BadData(
            "base58 string too short to contain checksum".to_string(),
        ))
    } else {
        let ck = Hash::sha256d(&data[..l - 4]);
        if ck.raw[0..4] != data[l - 4..] {
            Err(Error::ChecksumMismatch)
        } else {
            data.truncate(l - 4);
            Ok(data)
        }
    }
}
