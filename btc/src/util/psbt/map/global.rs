use crate::bitcoin::Tx;
use crate::util::bip32::{ExtendedPubKey, KeySource};
use crate::util::psbt::map::{
    insert_keyed, insert_proprietary, insert_unknown, merge_map, push_extra, push_keyed, Map,
};
use crate::util::psbt::raw::{self, Pair, ProprietaryKey};
use crate::util::psbt::serialize::{PsbtDeserialize, PsbtSerialize};
use crate::util::psbt::Error;
use crate::Result;
use bytes::Buf;
use log::trace;
use std::collections::BTreeMap;

/// Type: Unsigned Transaction PSBT_GLOBAL_UNSIGNED_TX = 0x00
pub const PSBT_GLOBAL_UNSIGNED_TX: u8 = 0x00;
/// Type: Extended Public Key PSBT_GLOBAL_XPUB = 0x01
pub const PSBT_GLOBAL_XPUB: u8 = 0x01;
/// Type: Version Number PSBT_GLOBAL_VERSION = 0xFB
pub const PSBT_GLOBAL_VERSION: u8 = 0xFB;
/// Type: Proprietary Use Type PSBT_GLOBAL_PROPRIETARY = 0xFC
pub const PSBT_GLOBAL_PROPRIETARY: u8 = 0xFC;

/// The global key-value map of a PSBT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Global {
    /// The transaction being signed. Its scriptSigs and witnesses must be empty.
    pub unsigned_tx: Tx,
    /// Extended public keys with the master fingerprint and path they were derived along.
    pub xpub: BTreeMap<ExtendedPubKey, KeySource>,
    /// The PSBT version number, 0 when absent.
    pub version: u32,
    pub proprietary: BTreeMap<ProprietaryKey, Vec<u8>>,
    pub unknown: BTreeMap<raw::Key, Vec<u8>>,
}

impl Global {
    /// Wrap an unsigned transaction. Fails if any input has a scriptSig or a witness.
    pub fn from_unsigned_tx(tx: Tx) -> Result<Global> {
        for input in tx.inputs.iter() {
            if !input.script_sig.is_empty() {
                return Err(Error::UnsignedTxHasScriptSigs.into());
            }
            if !input.witness.is_empty() {
                return Err(Error::UnsignedTxHasScriptWitnesses.into());
            }
        }
        Ok(Global {
            unsigned_tx: tx,
            xpub: BTreeMap::new(),
            version: 0,
            proprietary: BTreeMap::new(),
            unknown: BTreeMap::new(),
        })
    }

    /// Read the global map up to its separator.
    ///
    /// The unsigned transaction and the version are handled here because only one of each may
    /// appear, which [Map::insert_pair] can not tell for values that have defaults.
    pub fn decode(buffer: &mut dyn Buf) -> Result<Global> {
        let mut tx: Option<Tx> = None;
        let mut version: Option<u32> = None;
        let mut rv = Global {
            unsigned_tx: Tx::default(),
            xpub: BTreeMap::new(),
            version: 0,
            proprietary: BTreeMap::new(),
            unknown: BTreeMap::new(),
        };

        while let Some(pair) = Pair::decode(buffer)? {
            trace!("psbt global pair {}, {} byte value", pair.key, pair.value.len());
            match pair.key.type_value {
                PSBT_GLOBAL_UNSIGNED_TX => {
                    if !pair.key.key.is_empty() {
                        return Err(Error::InvalidKey(pair.key).into());
                    }
                    if tx.is_some() {
                        return Err(Error::DuplicateKey(pair.key).into());
                    }
                    // decoded without witnesses so that a zero-input transaction is not
                    // mistaken for a segwit marker
                    let mut value = &pair.value[..];
                    let unsigned = Tx::from_binary_legacy(&mut value)?;
                    if value.has_remaining() {
                        return Err(Error::InvalidValue(format!(
                            "{} bytes left over after the unsigned transaction",
                            value.remaining()
                        ))
                        .into());
                    }
                    tx = Some(unsigned);
                }
                PSBT_GLOBAL_VERSION => {
                    if !pair.key.key.is_empty() {
                        return Err(Error::InvalidKey(pair.key).into());
                    }
                    if version.is_some() {
                        return Err(Error::DuplicateKey(pair.key).into());
                    }
                    version = Some(u32::deserialize(&pair.value)?);
                }
                _ => rv.insert_pair(pair)?,
            }
        }

        let tx = tx.ok_or(Error::MustHaveUnsignedTx)?;
        let mut global = Global::from_unsigned_tx(tx)?;
        global.version = version.unwrap_or(0);
        global.xpub = rv.xpub;
        global.proprietary = rv.proprietary;
        global.unknown = rv.unknown;
        Ok(global)
    }
}

impl Map for Global {
    fn insert_pair(&mut self, pair: Pair) -> Result<()> {
        let Pair { key, value } = pair;
        match key.type_value {
            // the transaction is fixed when the map is created
            PSBT_GLOBAL_UNSIGNED_TX => Err(Error::DuplicateKey(key).into()),
            PSBT_GLOBAL_XPUB => {
                if key.key.len() != ExtendedPubKey::SIZE {
                    return Err(Error::InvalidKey(key).into());
                }
                insert_keyed(&mut self.xpub, key, &value)
            }
            PSBT_GLOBAL_VERSION => {
                if !key.key.is_empty() {
                    return Err(Error::InvalidKey(key).into());
                }
                self.version = u32::deserialize(&value)?;
                Ok(())
            }
            PSBT_GLOBAL_PROPRIETARY => insert_proprietary(&mut self.proprietary, key, value),
            _ => insert_unknown(&mut self.unknown, key, value),
        }
    }

    fn get_pairs(&self) -> Vec<Pair> {
        let mut unsigned_tx = Vec::with_capacity(self.unsigned_tx.legacy_size() as usize);
        // writing to a vec does not fail
        let _ = self.unsigned_tx.to_binary_legacy(&mut unsigned_tx);
        let mut rv = vec![Pair {
            key: raw::Key {
                type_value: PSBT_GLOBAL_UNSIGNED_TX,
                key: vec![],
            },
            value: unsigned_tx,
        }];
        push_keyed(&mut rv, PSBT_GLOBAL_XPUB, &self.xpub);
        if self.version != 0 {
            rv.push(Pair {
                key: raw::Key {
                    type_value: PSBT_GLOBAL_VERSION,
                    key: vec![],
                },
                value: self.version.serialize(),
            });
        }
        push_extra(&mut rv, &self.proprietary, &self.unknown);
        rv
    }

    fn merge(&mut self, other: Global) -> Result<()> {
        if self.unsigned_tx != other.unsigned_tx {
            return Err(Error::UnexpectedUnsignedTx {
                expected: Box::new(self.unsigned_tx.clone()),
                actual: Box::new(other.unsigned_tx),
            }
            .into());
        }
        self.version = self.version.max(other.version);
        merge_map(&mut self.xpub, other.xpub);
        merge_map(&mut self.proprietary, other.proprietary);
        merge_map(&mut self.unknown, other.unknown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitcoin::{Hash, Network, Outpoint, Script, TxInput, TxOutput};
    use crate::util::bip32::DerivationPath;
    use std::str::FromStr;

    const XPUB: &str = "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8";

    fn unsigned() -> Tx {
        Tx {
            version: 2,
            inputs: vec![TxInput::new(
                Outpoint::new(Hash::sha256d(b"prev"), 0),
                0xffffffff,
            )],
            outputs: vec![TxOutput::new(5000, Script::from(vec![0x51]))],
            lock_time: 0,
        }
    }

    fn round_trip(global: &Global) -> Global {
        let mut v = Vec::new();
        global.encode_map(&mut v).unwrap();
        assert_eq!(v.len() as u64, global.encoded_map_size());
        let mut slice = &v[..];
        let decoded = Global::decode(&mut slice).unwrap();
        assert!(slice.is_empty());
        decoded
    }

    #[test]
    fn rejects_signed_inputs() {
        let mut tx = unsigned();
        tx.inputs[0].script_sig = Script::from(vec![0x00]);
        assert!(matches!(
            Global::from_unsigned_tx(tx),
            Err(crate::Error::Psbt(Error::UnsignedTxHasScriptSigs))
        ));
        let mut tx = unsigned();
        tx.inputs[0].witness = vec![vec![1]];
        assert!(matches!(
            Global::from_unsigned_tx(tx),
            Err(crate::Error::Psbt(Error::UnsignedTxHasScriptWitnesses))
        ));
    }

    #[test]
    fn xpub_and_version_survive() {
        let mut global = Global::from_unsigned_tx(unsigned()).unwrap();
        let xpub = ExtendedPubKey::from_str(XPUB).unwrap();
        let path = DerivationPath::from_str("m/84'/0'/0'").unwrap();
        global.xpub.insert(xpub, (xpub.fingerprint(), path));
        global.version = 0;
        assert_eq!(round_trip(&global), global);
        global.version = 1;
        assert_eq!(round_trip(&global), global);
    }

    #[test]
    fn regtest_and_testnet_xpub_are_one_entry() {
        let mut global = Global::from_unsigned_tx(unsigned()).unwrap();
        let mut xpub = ExtendedPubKey::from_str(XPUB).unwrap();
        xpub.network = Network::Regtest;
        let path = DerivationPath::from_str("m/84'/1'/0'").unwrap();
        global.xpub.insert(xpub, (xpub.fingerprint(), path.clone()));
        xpub.network = Network::Testnet;
        global.xpub.insert(xpub, (xpub.fingerprint(), path));
        assert_eq!(global.xpub.len(), 1);

        let decoded = round_trip(&global);
        assert_eq!(decoded, global);
        let (key, _) = decoded.xpub.iter().next().unwrap();
        assert_eq!(key.network, Network::Testnet);
    }

    #[test]
    fn zero_input_tx() {
        let tx = Tx {
            version: 2,
            inputs: vec![],
            outputs: vec![TxOutput::new(1, Script::from(vec![0x51]))],
            lock_time: 0,
        };
        let global = Global::from_unsigned_tx(tx).unwrap();
        assert_eq!(round_trip(&global), global);
    }

    #[test]
    fn decode_errors() {
        // separator only
        let mut slice = &[0u8][..];
        assert!(matches!(
            Global::decode(&mut slice),
            Err(crate::Error::Psbt(Error::MustHaveUnsignedTx))
        ));

        let global = Global::from_unsigned_tx(unsigned()).unwrap();
        let tx_pair = global.get_pairs().remove(0);
        let mut v = Vec::new();
        tx_pair.encode(&mut v).unwrap();
        tx_pair.encode(&mut v).unwrap();
        v.push(0);
        assert!(matches!(
            Global::decode(&mut &v[..]),
            Err(crate::Error::Psbt(Error::DuplicateKey(_)))
        ));

        let version = Pair {
            key: raw::Key {
                type_value: PSBT_GLOBAL_VERSION,
                key: vec![],
            },
            value: vec![1, 0, 0],
        };
        let mut v = Vec::new();
        tx_pair.encode(&mut v).unwrap();
        version.encode(&mut v).unwrap();
        v.push(0);
        assert!(matches!(
            Global::decode(&mut &v[..]),
            Err(crate::Error::Psbt(Error::InvalidValue(_)))
        ));

        let mut bad_key = tx_pair.clone();
        bad_key.key.key = vec![1];
        let mut v = Vec::new();
        bad_key.encode(&mut v).unwrap();
        v.push(0);
        assert!(matches!(
            Global::decode(&mut &v[..]),
            Err(crate::Error::Psbt(Error::InvalidKey(_)))
        ));
    }

    #[test]
    fn repeated_xpub() {
        let mut global = Global::from_unsigned_tx(unsigned()).unwrap();
        let xpub = ExtendedPubKey::from_str(XPUB).unwrap();
        let pair = Pair {
            key: raw::Key {
                type_value: PSBT_GLOBAL_XPUB,
                key: xpub.encode().to_vec(),
            },
            value: xpub.fingerprint().as_bytes().to_vec(),
        };
        global.insert_pair(pair.clone()).unwrap();
        assert!(matches!(
            global.insert_pair(pair),
            Err(crate::Error::Psbt(Error::DuplicateKey(_)))
        ));
    }

    #[test]
    fn merge_requires_same_tx() {
        let mut a = Global::from_unsigned_tx(unsigned()).unwrap();
        let mut tx = unsigned();
        tx.lock_time = 1;
        let b = Global::from_unsigned_tx(tx).unwrap();
        assert!(matches!(
            a.merge(b),
            Err(crate::Error::Psbt(Error::UnexpectedUnsignedTx { .. }))
        ));

        let mut c = Global::from_unsigned_tx(unsigned()).unwrap();
        c.unknown.insert(
            raw::Key {
                type_value: 0x42,
                key: vec![],
            },
            vec![1],
        );
        c.version = 1;
        a.merge(c).unwrap();
        assert_eq!(a.unknown.len(), 1);
        assert_eq!(a.version, 1);
    }
}
