#![no_main]

use bitcoinlib::bitcoin::Encodable;
use bitcoinlib::util::psbt::Psbt;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(psbt) = Psbt::deserialize(data) {
        let encoded = psbt.serialize();
        assert_eq!(encoded.len() as u64, psbt.encoded_size());
        // the result may differ from the input, e.g. a zero version is dropped
        let _ = Psbt::deserialize(&encoded);
        for index in 0..psbt.inputs.len() {
            let _ = psbt.spending_utxo(index);
            let _ = psbt.check_input(index);
        }
        let _ = psbt.to_string();
    }
});
