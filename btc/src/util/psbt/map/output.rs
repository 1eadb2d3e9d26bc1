use crate::bitcoin::{PublicKey, Script};
use crate::util::bip32::KeySource;
use crate::util::psbt::map::{
    insert_keyed, insert_proprietary, insert_single, insert_unknown, merge_map, merge_option,
    push_extra, push_keyed, push_single, Map,
};
use crate::util::psbt::raw::{self, Pair, ProprietaryKey};
use crate::Result;
use std::collections::BTreeMap;

/// Type: Redeem Script PSBT_OUT_REDEEM_SCRIPT = 0x00
pub const PSBT_OUT_REDEEM_SCRIPT: u8 = 0x00;
/// Type: Witness Script PSBT_OUT_WITNESS_SCRIPT = 0x01
pub const PSBT_OUT_WITNESS_SCRIPT: u8 = 0x01;
/// Type: BIP 32 Derivation Path PSBT_OUT_BIP32_DERIVATION = 0x02
pub const PSBT_OUT_BIP32_DERIVATION: u8 = 0x02;
/// Type: Proprietary Use Type PSBT_OUT_PROPRIETARY = 0xFC
pub const PSBT_OUT_PROPRIETARY: u8 = 0xFC;

/// The key-value map for the output with the same index in the unsigned transaction.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Output {
    pub redeem_script: Option<Script>,
    pub witness_script: Option<Script>,
    /// The master fingerprints and derivation paths of keys in the output, so that a wallet
    /// can recognise its change.
    pub bip32_derivation: BTreeMap<PublicKey, KeySource>,
    pub proprietary: BTreeMap<ProprietaryKey, Vec<u8>>,
    pub unknown: BTreeMap<raw::Key, Vec<u8>>,
}

impl Map for Output {
    fn insert_pair(&mut self, pair: Pair) -> Result<()> {
        let Pair { key, value } = pair;
        match key.type_value {
            PSBT_OUT_REDEEM_SCRIPT => insert_single(&mut self.redeem_script, key, &value),
            PSBT_OUT_WITNESS_SCRIPT => insert_single(&mut self.witness_script, key, &value),
            PSBT_OUT_BIP32_DERIVATION => insert_keyed(&mut self.bip32_derivation, key, &value),
            PSBT_OUT_PROPRIETARY => insert_proprietary(&mut self.proprietary, key, value),
            _ => insert_unknown(&mut self.unknown, key, value),
        }
    }

    fn get_pairs(&self) -> Vec<Pair> {
        let mut rv = Vec::new();
        push_single(&mut rv, PSBT_OUT_REDEEM_SCRIPT, &self.redeem_script);
        push_single(&mut rv, PSBT_OUT_WITNESS_SCRIPT, &self.witness_script);
        push_keyed(&mut rv, PSBT_OUT_BIP32_DERIVATION, &self.bip32_derivation);
        push_extra(&mut rv, &self.proprietary, &self.unknown);
        rv
    }

    fn merge(&mut self, other: Output) -> Result<()> {
        merge_option(&mut self.redeem_script, other.redeem_script);
        merge_option(&mut self.witness_script, other.witness_script);
        merge_map(&mut self.bip32_derivation, other.bip32_derivation);
        merge_map(&mut self.proprietary, other.proprietary);
        merge_map(&mut self.unknown, other.unknown);
        Ok(())
    }
}
