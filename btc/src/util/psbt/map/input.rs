use crate::bitcoin::{
    Hash, Hash160, PublicKey, Ripemd160Hash, Script, Sha256Hash, SigHashType, Tx, TxOutput,
};
use crate::util::bip32::KeySource;
use crate::util::psbt::map::{
    insert_keyed, insert_preimage, insert_proprietary, insert_single, insert_unknown, merge_map,
    merge_option, push_extra, push_keyed, push_single, Map,
};
use crate::util::psbt::raw::{self, Pair, ProprietaryKey};
use crate::util::psbt::PsbtHash;
use crate::Result;
use std::collections::BTreeMap;

/// Type: Non-Witness UTXO PSBT_IN_NON_WITNESS_UTXO = 0x00
pub const PSBT_IN_NON_WITNESS_UTXO: u8 = 0x00;
/// Type: Witness UTXO PSBT_IN_WITNESS_UTXO = 0x01
pub const PSBT_IN_WITNESS_UTXO: u8 = 0x01;
/// Type: Partial Signature PSBT_IN_PARTIAL_SIG = 0x02
pub const PSBT_IN_PARTIAL_SIG: u8 = 0x02;
/// Type: Sighash Type PSBT_IN_SIGHASH_TYPE = 0x03
pub const PSBT_IN_SIGHASH_TYPE: u8 = 0x03;
/// Type: Redeem Script PSBT_IN_REDEEM_SCRIPT = 0x04
pub const PSBT_IN_REDEEM_SCRIPT: u8 = 0x04;
/// Type: Witness Script PSBT_IN_WITNESS_SCRIPT = 0x05
pub const PSBT_IN_WITNESS_SCRIPT: u8 = 0x05;
/// Type: BIP 32 Derivation Path PSBT_IN_BIP32_DERIVATION = 0x06
pub const PSBT_IN_BIP32_DERIVATION: u8 = 0x06;
/// Type: Finalized scriptSig PSBT_IN_FINAL_SCRIPTSIG = 0x07
pub const PSBT_IN_FINAL_SCRIPTSIG: u8 = 0x07;
/// Type: Finalized scriptWitness PSBT_IN_FINAL_SCRIPTWITNESS = 0x08
pub const PSBT_IN_FINAL_SCRIPTWITNESS: u8 = 0x08;
/// Type: RIPEMD160 preimage PSBT_IN_RIPEMD160 = 0x0A
pub const PSBT_IN_RIPEMD160: u8 = 0x0A;
/// Type: SHA256 preimage PSBT_IN_SHA256 = 0x0B
pub const PSBT_IN_SHA256: u8 = 0x0B;
/// Type: HASH160 preimage PSBT_IN_HASH160 = 0x0C
pub const PSBT_IN_HASH160: u8 = 0x0C;
/// Type: HASH256 preimage PSBT_IN_HASH256 = 0x0D
pub const PSBT_IN_HASH256: u8 = 0x0D;
/// Type: Proprietary Use Type PSBT_IN_PROPRIETARY = 0xFC
pub const PSBT_IN_PROPRIETARY: u8 = 0xFC;

/// The key-value map for the input with the same index in the unsigned transaction.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Input {
    /// The whole transaction this input spends from. Needed for inputs that spend legacy
    /// outputs.
    pub non_witness_utxo: Option<Tx>,
    /// The output this input spends. Only for segwit outputs, including those wrapped in P2SH.
    pub witness_utxo: Option<TxOutput>,
    /// Signatures by public key, as they would be pushed in a scriptSig or witness.
    pub partial_sigs: BTreeMap<PublicKey, Vec<u8>>,
    /// The sighash type that signatures for this input must use.
    pub sighash_type: Option<SigHashType>,
    pub redeem_script: Option<Script>,
    pub witness_script: Option<Script>,
    /// The master fingerprints and derivation paths of the keys needed to sign.
    pub bip32_derivation: BTreeMap<PublicKey, KeySource>,
    /// The completed scriptSig.
    pub final_script_sig: Option<Script>,
    /// The completed witness stack.
    pub final_script_witness: Option<Vec<Vec<u8>>>,
    pub ripemd160_preimages: BTreeMap<Ripemd160Hash, Vec<u8>>,
    pub sha256_preimages: BTreeMap<Sha256Hash, Vec<u8>>,
    pub hash160_preimages: BTreeMap<Hash160, Vec<u8>>,
    pub hash256_preimages: BTreeMap<Hash, Vec<u8>>,
    pub proprietary: BTreeMap<ProprietaryKey, Vec<u8>>,
    pub unknown: BTreeMap<raw::Key, Vec<u8>>,
}

impl Map for Input {
    fn insert_pair(&mut self, pair: Pair) -> Result<()> {
        let Pair { key, value } = pair;
        match key.type_value {
            PSBT_IN_NON_WITNESS_UTXO => insert_single(&mut self.non_witness_utxo, key, &value),
            PSBT_IN_WITNESS_UTXO => insert_single(&mut self.witness_utxo, key, &value),
            PSBT_IN_PARTIAL_SIG => insert_keyed(&mut self.partial_sigs, key, &value),
            PSBT_IN_SIGHASH_TYPE => insert_single(&mut self.sighash_type, key, &value),
            PSBT_IN_REDEEM_SCRIPT => insert_single(&mut self.redeem_script, key, &value),
            PSBT_IN_WITNESS_SCRIPT => insert_single(&mut self.witness_script, key, &value),
            PSBT_IN_BIP32_DERIVATION => insert_keyed(&mut self.bip32_derivation, key, &value),
            PSBT_IN_FINAL_SCRIPTSIG => insert_single(&mut self.final_script_sig, key, &value),
            PSBT_IN_FINAL_SCRIPTWITNESS => {
                insert_single(&mut self.final_script_witness, key, &value)
            }
            PSBT_IN_RIPEMD160 => insert_preimage(
                &mut self.ripemd160_preimages,
                key,
                value,
                Ripemd160Hash::generate,
                PsbtHash::Ripemd160,
            ),
            PSBT_IN_SHA256 => insert_preimage(
                &mut self.sha256_preimages,
                key,
                value,
                Sha256Hash::generate,
                PsbtHash::Sha256,
            ),
            PSBT_IN_HASH160 => insert_preimage(
                &mut self.hash160_preimages,
                key,
                value,
                Hash160::generate,
                PsbtHash::Hash160,
            ),
            PSBT_IN_HASH256 => insert_preimage(
                &mut self.hash256_preimages,
                key,
                value,
                Hash::sha256d,
                PsbtHash::Hash256,
            ),
            PSBT_IN_PROPRIETARY => insert_proprietary(&mut self.proprietary, key, value),
            _ => insert_unknown(&mut self.unknown, key, value),
        }
    }

    fn get_pairs(&self) -> Vec<Pair> {
        let mut rv = Vec::new();
        push_single(&mut rv, PSBT_IN_NON_WITNESS_UTXO, &self.non_witness_utxo);
        push_single(&mut rv, PSBT_IN_WITNESS_UTXO, &self.witness_utxo);
        push_keyed(&mut rv, PSBT_IN_PARTIAL_SIG, &self.partial_sigs);
        push_single(&mut rv, PSBT_IN_SIGHASH_TYPE, &self.sighash_type);
        push_single(&mut rv, PSBT_IN_REDEEM_SCRIPT, &self.redeem_script);
        push_single(&mut rv, PSBT_IN_WITNESS_SCRIPT, &self.witness_script);
        push_keyed(&mut rv, PSBT_IN_BIP32_DERIVATION, &self.bip32_derivation);
        push_single(&mut rv, PSBT_IN_FINAL_SCRIPTSIG, &self.final_script_sig);
        push_single(&mut rv, PSBT_IN_FINAL_SCRIPTWITNESS, &self.final_script_witness);
        push_keyed(&mut rv, PSBT_IN_RIPEMD160, &self.ripemd160_preimages);
        push_keyed(&mut rv, PSBT_IN_SHA256, &self.sha256_preimages);
        push_keyed(&mut rv, PSBT_IN_HASH160, &self.hash160_preimages);
        push_keyed(&mut rv, PSBT_IN_HASH256, &self.hash256_preimages);
        push_extra(&mut rv, &self.proprietary, &self.unknown);
        rv
    }

    fn merge(&mut self, other: Input) -> Result<()> {
        merge_option(&mut self.non_witness_utxo, other.non_witness_utxo);
        merge_option(&mut self.witness_utxo, other.witness_utxo);
        merge_map(&mut self.partial_sigs, other.partial_sigs);
        merge_option(&mut self.sighash_type, other.sighash_type);
        merge_option(&mut self.redeem_script, other.redeem_script);
        merge_option(&mut self.witness_script, other.witness_script);
        merge_map(&mut self.bip32_derivation, other.bip32_derivation);
        merge_option(&mut self.final_script_sig, other.final_script_sig);
        merge_option(&mut self.final_script_witness, other.final_script_witness);
        merge_map(&mut self.ripemd160_preimages, other.ripemd160_preimages);
        merge_map(&mut self.sha256_preimages, other.sha256_preimages);
        merge_map(&mut self.hash160_preimages, other.hash160_preimages);
        merge_map(&mut self.hash256_preimages, other.hash256_preimages);
        merge_map(&mut self.proprietary, other.proprietary);
        merge_map(&mut self.unknown, other.unknown);
        Ok(())
    }
}
