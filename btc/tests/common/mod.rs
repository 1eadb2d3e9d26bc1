use bitcoinlib::bitcoin::{Hash, Network, Outpoint, PrivateKey, Script, Tx, TxInput, TxOutput};
use bitcoinlib::util::address::Address;

/// Initialize test logging (call once per test)
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A transaction paying `value` to each of the given scripts, which a test can then spend.
pub fn funding_tx(scripts: &[Script], value: u64) -> Tx {
    Tx {
        version: 2,
        inputs: vec![TxInput::new(
            Outpoint::new(Hash::sha256d(b"funding"), 0),
            0xffffffff,
        )],
        outputs: scripts
            .iter()
            .map(|s| TxOutput::new(value, s.clone()))
            .collect(),
        lock_time: 0,
    }
}

/// A fresh key and the native segwit address it controls.
pub fn wallet_key(network: Network) -> (PrivateKey, Address) {
    let key = PrivateKey::generate(network);
    let address = Address::p2wpkh(&key.public_key(), network).unwrap();
    (key, address)
}
