#![no_main]

use bitcoinlib::bitcoin::{Encodable, Tx};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buffer = data;
    if let Ok(tx) = Tx::from_binary(&mut buffer) {
        let encoded = tx.to_binary_vec().unwrap();
        assert_eq!(encoded.len() as u64, tx.encoded_size());
        let mut legacy = Vec::new();
        tx.to_binary_legacy(&mut legacy).unwrap();
        assert_eq!(legacy.len() as u64, tx.legacy_size());
        let _ = tx.txid();
        let _ = tx.wtxid();
    }
});
