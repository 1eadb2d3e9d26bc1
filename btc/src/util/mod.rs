pub mod address;
pub mod bip32;
pub mod psbt;
pub mod taproot;
