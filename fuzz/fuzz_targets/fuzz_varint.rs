#![no_main]

use bitcoinlib::bitcoin::{varint_decode, varint_encode, varint_size};
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buffer = data;
    if let Ok(value) = varint_decode(&mut buffer) {
        let mut encode_buffer = BytesMut::new();
        varint_encode(&mut encode_buffer, value).unwrap();
        assert_eq!(varint_size(value) as usize, encode_buffer.len());

        // the encoding written is always canonical, so it decodes to the same value
        let mut decode_buffer = encode_buffer.as_ref();
        assert_eq!(varint_decode(&mut decode_buffer).unwrap(), value);
    }
});
