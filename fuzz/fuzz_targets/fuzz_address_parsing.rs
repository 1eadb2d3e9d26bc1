#![no_main]

use bitcoinlib::util::address::Address;
use libfuzzer_sys::fuzz_target;
use std::str::FromStr;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(address) = Address::from_str(s) {
            let script = address.script_pubkey();
            assert_eq!(
                Address::from_script(&script, address.network).as_ref(),
                Some(&address)
            );
            let reparsed = Address::from_str(&address.to_string()).unwrap();
            assert_eq!(reparsed, address);
        }
    }
});
