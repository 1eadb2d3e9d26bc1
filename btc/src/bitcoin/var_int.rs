use bytes::{Buf, BufMut};

/// The size of the value encoded as a varint.
pub fn varint_size(value: u64) -> u64 {
    match value {
        0..=252 => 1,
        253..=0xffff => 3,
        0x10000..=0xffffffff => 5,
        _ => 9,
    }
}

/// Read a varint from the buffer.
///
/// Fails if the buffer does not hold the complete encoding.
pub fn varint_decode(buffer: &mut dyn Buf) -> crate::Result<u64> {
    let n0 = buffer.try_get_u8()?;
    let v = match n0 {
        0xff => buffer.try_get_u64_le()?,
        0xfe => buffer.try_get_u32_le()? as u64,
        0xfd => buffer.try_get_u16_le()? as u64,
        _ => n0 as u64,
    };
    Ok(v)
}

/// Write a varint to the buffer.
pub fn varint_encode(buffer: &mut dyn BufMut, value: u64) -> crate::Result<()> {
    match value {
        0..=252 => buffer.put_u8(value as u8),
        253..=0xffff => {
            buffer.put_u8(0xfd);
            buffer.put_u16_le(value as u16);
        }
        0x10000..=0xffffffff => {
            buffer.put_u8(0xfe);
            buffer.put_u32_le(value as u32);
        }
        _ => {
            buffer.put_u8(0xff);
            buffer.put_u64_le(value);
        }
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size() {
        assert_eq!(varint_size(0), 1);
        assert_eq!(varint_size(253), 3);
        assert_eq!(varint_size(u16::MAX as u64), 3);
        assert_eq!(varint_size(u32::MAX as u64), 5);
        assert_eq!(varint_size(u64::MAX), 9);
    }

    #[test]
    fn test_known_values() {
        let mut v = Vec::new();
        varint_encode(&mut v, 0).unwrap();
        assert_eq!(v, vec![0]);
        v.clear();
        varint_encode(&mut v, 252).unwrap();
        assert_eq!(v, vec![252]);
        v.clear();
        varint_encode(&mut v, 253).unwrap();
        assert_eq!(v, vec![253, 253, 0]);
        v.clear();
        varint_encode(&mut v, 256).unwrap();
        assert_eq!(v, vec![253, 0, 1]);
        v.clear();
        varint_encode(&mut v, 65536).unwrap();
        assert_eq!(v, vec![254, 0, 0, 1, 0]);
        v.clear();
        varint_encode(&mut v, 4294967296).unwrap();
        assert_eq!(v, vec![255, 0, 0, 0, 0, 1, 0, 0, 0]);
    }

    /// A truncated varint must be reported, not panic.
    #[test]
    fn decode_truncated() {
        let mut empty: &[u8] = &[];
        assert!(varint_decode(&mut empty).is_err());
        let mut short: &[u8] = &[0xfd, 0x01];
        assert!(varint_decode(&mut short).is_err());
        let mut short: &[u8] = &[0xff, 0, 0, 0, 0];
        assert!(varint_decode(&mut short).is_err());
    }
}
