//! End-to-end payment flows through the public chain-bsv API:
//! keys -> addresses -> build/sign -> parse and verify the raw transaction.

use chain_bsv::builder::{create_transaction, sweep};
use chain_bsv::cooperative::{generate_sighash_single_rawtx, get_rawtx_to_pay};
use chain_bsv::sighash::{preimage, verify_p2pkh_input};
use chain_bsv::transaction::TxOutput;
use chain_bsv::{
    base58, script, BsvError, BsvNetwork, Destination, FeePolicy, PrivateKey, SighashType, Spend,
    Transaction, UnspentOutput, WifKey,
};

fn key(n: u8) -> WifKey {
    let mut scalar = [0u8; 32];
    scalar[0] = 0x11;
    scalar[31] = n;
    WifKey::new(PrivateKey::from_bytes(&scalar).unwrap(), BsvNetwork::Mainnet, true)
}

fn utxo(tag: u8, output_index: u32, amount: u64) -> UnspentOutput {
    UnspentOutput {
        txid: hex::encode([tag; 32]),
        output_index,
        amount,
    }
}

// ─── Scenario A: standard payment with change ──────────────────────

#[test]
fn payment_two_inputs_with_change() {
    let (k1, k2) = (key(1), key(2));
    let recipient = key(9).address();
    let change = k1.address();
    let spends = [
        Spend::new(utxo(0x01, 0, 70_000), &k1),
        Spend::new(utxo(0x02, 5, 30_000), &k2),
    ];

    let built = create_transaction(
        &spends,
        &[Destination::payment(recipient.clone(), 40_000)],
        &change,
        &FeePolicy::default(),
    )
    .unwrap();

    assert_eq!(built.fee, 187);
    assert_eq!(built.amount, 40_187);
    let created = built.created_utxo.clone().unwrap();
    assert_eq!((created.output_index, created.amount), (1, 59_813));

    let tx = Transaction::from_hex(&built.raw_tx).unwrap();
    assert_eq!(tx.version, 1);
    assert_eq!(tx.lock_time, 0);
    assert!(tx.inputs.iter().all(|i| i.sequence == 0xFFFF_FFFF));
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(
        script::p2pkh_pubkey_hash(&tx.outputs[0].script_pubkey).unwrap(),
        chain_bsv::address::address_to_pubkey_hash(&recipient).unwrap()
    );
    assert_eq!(tx.txid(), built.txid);
    assert_eq!(chain_bsv::transaction::calc_txid(&built.raw_tx).unwrap(), built.txid);

    for (i, amount) in [70_000, 30_000].into_iter().enumerate() {
        assert_eq!(verify_p2pkh_input(&tx, i, amount).unwrap(), SighashType::All);
    }
}

// ─── Scenario B: sweep ─────────────────────────────────────────────

#[test]
fn sweep_one_input() {
    let k1 = key(1);
    let spends = [Spend::new(utxo(0x03, 0, 10_000), &k1)];
    let built = sweep(&spends, &key(9).address(), &FeePolicy::default()).unwrap();

    let tx = Transaction::from_hex(&built.raw_tx).unwrap();
    assert_eq!(built.fee, 96);
    assert_eq!(tx.outputs.len(), 1);
    assert_eq!(tx.outputs[0].amount, 9_904);
}

// ─── Scenario C / D: codec and WIF ─────────────────────────────────

#[test]
fn check_codec_twenty_zero_bytes() {
    let encoded = base58::encode_check(&[0u8; 20]);
    assert_eq!(base58::decode_check(&encoded).unwrap(), vec![0u8; 20]);
}

#[test]
fn wif_with_compression_suffix() {
    let scalar: [u8; 32] = core::array::from_fn(|i| i as u8 + 1);
    let mut payload = vec![0x80];
    payload.extend_from_slice(&scalar);
    payload.push(0x01);

    let decoded = WifKey::from_wif(&base58::encode_check(&payload)).unwrap();
    assert_eq!(*decoded.key.to_bytes(), scalar);
    assert_eq!(decoded.network.to_string(), "main");
    assert!(decoded.compressed);
}

// ─── Dust boundary ─────────────────────────────────────────────────

fn leftover_case(leftover: u64) -> chain_bsv::BuiltTransaction {
    let k1 = key(1);
    // 1 input, 2 outputs: 226 bytes, fee 113.
    let spends = [Spend::new(utxo(0x04, 0, 10_000 + 113 + leftover), &k1)];
    create_transaction(
        &spends,
        &[Destination::payment(key(9).address(), 10_000)],
        &k1.address(),
        &FeePolicy::default(),
    )
    .unwrap()
}

#[test]
fn leftover_of_546_is_not_returned() {
    let built = leftover_case(546);
    assert!(built.created_utxo.is_none());
    assert_eq!(Transaction::from_hex(&built.raw_tx).unwrap().outputs.len(), 1);
}

#[test]
fn leftover_of_547_becomes_change() {
    let built = leftover_case(547);
    assert_eq!(built.created_utxo.unwrap().amount, 547);
    assert_eq!(Transaction::from_hex(&built.raw_tx).unwrap().outputs.len(), 2);
}

#[test]
fn custom_dust_threshold() {
    let k1 = key(1);
    let spends = [Spend::new(utxo(0x04, 0, 10_000 + 113 + 100), &k1)];
    let policy = FeePolicy {
        dust_threshold: 99,
        ..FeePolicy::default()
    };
    let built = create_transaction(
        &spends,
        &[Destination::payment(key(9).address(), 10_000)],
        &k1.address(),
        &policy,
    )
    .unwrap();
    assert_eq!(built.created_utxo.unwrap().amount, 100);
}

#[test]
fn insufficient_funds_reports_shortfall() {
    let k1 = key(1);
    let spends = [Spend::new(utxo(0x05, 0, 5_000), &k1)];
    let err = create_transaction(
        &spends,
        &[Destination::payment(key(9).address(), 5_000)],
        &k1.address(),
        &FeePolicy::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        BsvError::InsufficientFunds {
            needed: 5_113,
            available: 5_000
        }
    );
}

// ─── Determinism ───────────────────────────────────────────────────

#[test]
fn identical_inputs_give_identical_transactions() {
    let (k1, k2) = (key(1), key(2));
    let build = || {
        let spends = [
            Spend::new(utxo(0x01, 0, 70_000), &k1),
            Spend::new(utxo(0x02, 5, 30_000), &k2),
        ];
        create_transaction(
            &spends,
            &[Destination::payment(key(9).address(), 40_000)],
            &k1.address(),
            &FeePolicy::default(),
        )
        .unwrap()
    };
    assert_eq!(build(), build());
}

// ─── Cooperative protocol ──────────────────────────────────────────

#[test]
fn appending_output_leaves_none_preimage_unchanged() {
    let (k1, k2) = (key(1), key(2));
    let spends = [
        Spend::new(utxo(0x06, 0, 25_000), &k1),
        Spend::new(utxo(0x07, 1, 15_000), &k2),
    ];
    let partial = generate_sighash_single_rawtx(&spends, &k1.address(), 12_000).unwrap();
    let mut tx = partial.to_transaction().unwrap();

    let code_1 = script::p2pkh_lock_script(&k2.public_key().hash160());
    let code_0 = script::p2pkh_lock_script(&k1.public_key().hash160());
    let none_before = preimage(&tx, 1, &code_1, 15_000, SighashType::None).unwrap();
    let single_before = preimage(&tx, 0, &code_0, 25_000, SighashType::Single).unwrap();

    tx.outputs.push(TxOutput::p2pkh(&[0x42; 20], 11_000));

    assert_eq!(
        preimage(&tx, 1, &code_1, 15_000, SighashType::None).unwrap(),
        none_before
    );
    assert_eq!(
        preimage(&tx, 0, &code_0, 25_000, SighashType::Single).unwrap(),
        single_before
    );
    assert!(verify_p2pkh_input(&tx, 0, 25_000).is_ok());
    assert!(verify_p2pkh_input(&tx, 1, 15_000).is_ok());
}

#[test]
fn cooperative_payment_end_to_end() {
    let (payer_a, payer_b) = (key(1), key(2));
    let payee = key(9);
    let spends = [
        Spend::new(utxo(0x08, 0, 25_000), &payer_a),
        Spend::new(utxo(0x09, 3, 15_000), &payer_b),
    ];

    let partial = generate_sighash_single_rawtx(&spends, &payer_a.address(), 12_000).unwrap();
    let json = serde_json::to_string(&partial).unwrap();

    // Payee side: only sees the JSON and looks up input values itself.
    let scanned: chain_bsv::PartialTransaction = serde_json::from_str(&json).unwrap();
    let amounts: Vec<u64> = scanned
        .outpoints()
        .unwrap()
        .into_iter()
        .map(|(txid, index)| match (txid.as_str(), index) {
            (t, 0) if t == hex::encode([0x08; 32]) => 25_000,
            (t, 3) if t == hex::encode([0x09; 32]) => 15_000,
            other => panic!("unexpected outpoint {other:?}"),
        })
        .collect();

    let built =
        get_rawtx_to_pay(&scanned, &amounts, &payee.address(), &FeePolicy::default()).unwrap();
    let tx = Transaction::from_hex(&built.raw_tx).unwrap();

    assert_eq!(tx.outputs[0].amount, 28_000);
    assert_eq!(tx.outputs[1].amount, 12_000 - built.fee);
    assert_eq!(built.fee, FeePolicy::default().fee_for_size(tx.size()));
    assert_eq!(
        script::p2pkh_pubkey_hash(&tx.outputs[1].script_pubkey).unwrap(),
        payee.public_key().hash160()
    );
    assert_eq!(built.created_utxo.unwrap().output_index, 1);
}
