// Integration tests for partially signed transactions.
// Each test plays the roles of BIP174: a creator builds the PSBT, updaters add what they know,
// the results are combined and the finalized transaction is extracted.

mod common;

use bitcoinlib::bitcoin::{
    Encodable, Network, Outpoint, Script, ScriptBuilder, SigHashType, Tx, TxInput, TxOutput,
};
use bitcoinlib::util::address::{Address, AddressType};
use bitcoinlib::util::bip32::{DerivationPath, Fingerprint};
use bitcoinlib::util::psbt::{self, Psbt};
use common::{funding_tx, init_test_logging, wallet_key};
use std::str::FromStr;

#[test]
fn test_create_update_combine_extract() {
    init_test_logging();

    let (key_a, addr_a) = wallet_key(Network::Regtest);
    let (key_b, _) = wallet_key(Network::Regtest);
    let pk_a = key_a.public_key();
    let pk_b = key_b.public_key();

    // a 1-of-2 multisig in p2sh-p2wsh
    let multisig = ScriptBuilder::new()
        .push_int(1)
        .push_slice(&pk_a.to_bytes())
        .push_slice(&pk_b.to_bytes())
        .push_int(2)
        .push_opcode(bitcoinlib::bitcoin::opcodes::OP_CHECKMULTISIG)
        .build();
    let nested = Address::p2shwsh(&multisig, Network::Regtest);
    assert_eq!(nested.address_type(), Some(AddressType::P2sh));

    let funding = funding_tx(&[addr_a.script_pubkey(), nested.script_pubkey()], 50_000);
    let txid = funding.txid();

    // creator
    let unsigned = Tx {
        version: 2,
        inputs: vec![
            TxInput::new(Outpoint::new(txid, 0), 0xfffffffd),
            TxInput::new(Outpoint::new(txid, 1), 0xfffffffd),
        ],
        outputs: vec![TxOutput::new(99_000, addr_a.script_pubkey())],
        lock_time: 0,
    };
    let created = Psbt::from_unsigned_tx(unsigned).unwrap();
    let wire = created.to_string();

    // updater one knows the utxos and scripts
    let mut one = Psbt::from_str(&wire).unwrap();
    one.inputs[0].witness_utxo = Some(funding.outputs[0].clone());
    one.inputs[0].bip32_derivation.insert(
        pk_a,
        (
            Fingerprint::from([0xaa, 0xbb, 0xcc, 0xdd]),
            DerivationPath::from_str("m/84'/1'/0'/0/0").unwrap(),
        ),
    );
    one.inputs[1].non_witness_utxo = Some(funding.clone());
    one.inputs[1].redeem_script = Some(multisig.to_v0_p2wsh());
    one.inputs[1].witness_script = Some(multisig.clone());
    one.check_input(0).unwrap();
    one.check_input(1).unwrap();

    // updater two adds signatures
    let mut two = Psbt::from_str(&wire).unwrap();
    two.inputs[0].partial_sigs.insert(pk_a, vec![0x30; 71]);
    two.inputs[0].sighash_type = Some(SigHashType::All);
    two.inputs[1].partial_sigs.insert(pk_b, vec![0x30; 70]);

    // combiner
    let mut combined = Psbt::from_str(&one.to_string()).unwrap();
    combined.merge(Psbt::from_str(&two.to_string()).unwrap()).unwrap();
    assert_eq!(combined.inputs[0].partial_sigs.len(), 1);
    assert!(combined.inputs[1].witness_script.is_some());
    assert_eq!(combined.spending_utxo(1).unwrap(), &funding.outputs[1]);

    // finalizer
    combined.inputs[0].final_script_witness = Some(vec![vec![0x30; 71], pk_a.to_bytes()]);
    let mut redeem_push = ScriptBuilder::new();
    redeem_push.push_slice(multisig.to_v0_p2wsh().as_bytes());
    combined.inputs[1].final_script_sig = Some(redeem_push.build());
    combined.inputs[1].final_script_witness =
        Some(vec![vec![], vec![0x30; 70], multisig.raw.clone()]);

    let reparsed = Psbt::deserialize(&combined.serialize()).unwrap();
    assert_eq!(reparsed, combined);

    // extractor
    let tx = combined.extract_tx();
    assert!(tx.has_witness());
    assert!(tx.inputs[0].script_sig.is_empty());
    assert_eq!(tx.inputs[1].script_sig, redeem_push.build());
    assert_eq!(tx.inputs[1].witness.len(), 3);
    assert_ne!(tx.txid(), created.unsigned_tx().txid());
    assert_ne!(tx.wtxid(), tx.txid());
    let bin = tx.to_binary_vec().unwrap();
    assert_eq!(Tx::from_binary(&mut &bin[..]).unwrap(), tx);
}

#[test]
fn test_merge_rejects_other_transaction() {
    init_test_logging();
    let (_, addr) = wallet_key(Network::Testnet);
    let funding = funding_tx(&[addr.script_pubkey()], 1_000);
    let tx = |lock_time| Tx {
        version: 2,
        inputs: vec![TxInput::new(Outpoint::new(funding.txid(), 0), 0xffffffff)],
        outputs: vec![TxOutput::new(900, Script::new())],
        lock_time,
    };
    let mut a = Psbt::from_unsigned_tx(tx(0)).unwrap();
    let b = Psbt::from_unsigned_tx(tx(100)).unwrap();
    match a.merge(b) {
        Err(bitcoinlib::Error::Psbt(psbt::Error::UnexpectedUnsignedTx { expected, actual })) => {
            assert_eq!(expected.lock_time, 0);
            assert_eq!(actual.lock_time, 100);
        }
        other => panic!("expected UnexpectedUnsignedTx, got {:?}", other),
    }
}

#[test]
fn test_mismatched_non_witness_utxo_still_parses() {
    // the mismatch is reported by check_input, decoding only logs it
    init_test_logging();
    let (_, addr) = wallet_key(Network::Bitcoin);
    let funding = funding_tx(&[addr.script_pubkey()], 1_000);
    let mut other = funding.clone();
    other.version = 1;
    let unsigned = Tx {
        version: 2,
        inputs: vec![TxInput::new(Outpoint::new(funding.txid(), 0), 0xffffffff)],
        outputs: vec![TxOutput::new(900, addr.script_pubkey())],
        lock_time: 0,
    };
    let mut psbt = Psbt::from_unsigned_tx(unsigned).unwrap();
    psbt.inputs[0].non_witness_utxo = Some(other);
    let decoded = Psbt::deserialize(&psbt.serialize()).unwrap();
    assert!(matches!(
        decoded.check_input(0),
        Err(bitcoinlib::Error::Psbt(psbt::Error::InvalidNonWitnessUtxo { .. }))
    ));
}

#[test]
fn test_signed_transaction_is_not_a_psbt() {
    let (_, addr) = wallet_key(Network::Bitcoin);
    let mut tx = funding_tx(&[addr.script_pubkey()], 1_000);
    tx.inputs[0].script_sig = Script::from(vec![0x51]);
    assert!(matches!(
        Psbt::from_unsigned_tx(tx.clone()),
        Err(bitcoinlib::Error::Psbt(psbt::Error::UnsignedTxHasScriptSigs))
    ));
    // a network transaction does not start with the magic
    let bin = tx.to_binary_vec().unwrap();
    assert!(matches!(
        Psbt::deserialize(&bin),
        Err(bitcoinlib::Error::Psbt(psbt::Error::InvalidMagic))
    ));
}
