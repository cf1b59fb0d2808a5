use ethtx_eip2930::{AccessList, AccessListItem};
use ethtx_primitives::{Address, B256, Bytes, TxKind, U256, address, b256, hex};
use ethtx_rlp::Item;
use ethtx_test_utils::secret_key::{SECRET_KEYS, secret_key_bytes, secret_key_to_address};
use ethtx_transaction::{
    DecodeError, EncodeType, EnvelopeParts, SignError, Transaction, TransactionType,
};

const DUMMY_SECRET_KEY: &str = "e331b6d69882b4cb4ea581d88e0b604039a3de5967688d3dcffdd2270c0fd109";

fn dummy_parts() -> EnvelopeParts {
    EnvelopeParts {
        chain_id: Some(U256::from(1)),
        nonce: U256::from(1),
        kind: TxKind::Call(address!("0xc014ba5ec014ba5ec014ba5ec014ba5ec014ba5e")),
        value: U256::from(4),
        input: Bytes::from_static(&[0x12, 0x34]),
        gas_limit: U256::from(3),
        access_list: AccessList(vec![AccessListItem {
            address: Address::ZERO,
            storage_keys: vec![B256::ZERO, B256::from(U256::from(1))],
        }]),
        ..EnvelopeParts::default()
    }
}

macro_rules! impl_test_signed_transaction_encoding_round_trip {
    ($(
        $name:ident => $transaction_type:expr, $parts:expr,
    )+) => {
        $(
            paste::item! {
                #[test]
                fn [<signed_transaction_encoding_round_trip_ $name>]() -> anyhow::Result<()> {
                    let secret_key = secret_key_bytes(SECRET_KEYS[0])?;

                    let mut transaction = Transaction::new($transaction_type, $parts);
                    transaction.sign(&secret_key, false)?;

                    let encoded = transaction.encode(EncodeType::Transaction);
                    let decoded = Transaction::decode(&encoded)?;

                    assert_eq!(decoded, transaction);
                    assert_eq!(decoded.hash(), transaction.hash());
                    assert_eq!(decoded.sender(), Some(secret_key_to_address(SECRET_KEYS[0])?));

                    Ok(())
                }
            }
        )+
    };
}

impl_test_signed_transaction_encoding_round_trip! {
    pre_eip155 => TransactionType::Legacy, EnvelopeParts {
        nonce: U256::ZERO,
        gas_price: Some(U256::from(1)),
        gas_limit: U256::from(2),
        kind: TxKind::Call(Address::default()),
        value: U256::from(3),
        input: Bytes::from(vec![1, 2]),
        ..EnvelopeParts::default()
    },
    post_eip155 => TransactionType::Legacy, EnvelopeParts {
        chain_id: Some(U256::from(1337)),
        nonce: U256::ZERO,
        gas_price: Some(U256::from(1)),
        gas_limit: U256::from(2),
        kind: TxKind::Create,
        value: U256::from(3),
        input: Bytes::from(vec![1, 2]),
        ..EnvelopeParts::default()
    },
    eip2930 => TransactionType::Eip2930, EnvelopeParts {
        chain_id: Some(U256::from(1)),
        nonce: U256::ZERO,
        gas_price: Some(U256::from(1)),
        gas_limit: U256::from(2),
        kind: TxKind::Call(Address::default()),
        value: U256::from(3),
        input: Bytes::from(vec![1, 2]),
        ..EnvelopeParts::default()
    },
    eip1559 => TransactionType::Eip1559, EnvelopeParts {
        chain_id: Some(U256::from(1)),
        nonce: U256::ZERO,
        max_priority_fee_per_gas: Some(U256::from(1)),
        max_fee_per_gas: Some(U256::from(2)),
        gas_limit: U256::from(3),
        kind: TxKind::Create,
        value: U256::from(4),
        input: Bytes::from(vec![1, 2]),
        ..EnvelopeParts::default()
    },
    eip1559_with_access_list => TransactionType::Eip1559, dummy_parts(),
}

#[test]
fn eip2930_signature_matches_hardhat() -> anyhow::Result<()> {
    let mut transaction = Transaction::new(
        TransactionType::Eip2930,
        EnvelopeParts {
            gas_price: Some(U256::from(2)),
            ..dummy_parts()
        },
    );
    transaction.sign(&secret_key_bytes(DUMMY_SECRET_KEY)?, false)?;

    // Generated by Hardhat
    assert_eq!(
        hex::encode(transaction.encode(EncodeType::Transaction)),
        "01f8bd0101020394c014ba5ec014ba5ec014ba5ec014ba5ec014ba5e04821234f85bf859940000000000000000000000000000000000000000f842a00000000000000000000000000000000000000000000000000000000000000000a0000000000000000000000000000000000000000000000000000000000000000101a0a9f9f0c845cc2d257838df2679a59af6f19055012ce1de11ba25b4ca9df503cfa02c70c54cf6c49b4a641b269c93308fa07de541aa3bcd3fce0fc722aaabe3a8d8"
    );
    assert_eq!(
        transaction.hash(),
        b256!("0x1d4f5ef5c7b4b0bd61d4dd622615ec280ae5b9a57136ce6b7686025999220611")
    );
    assert_eq!(
        transaction.sender(),
        Some(secret_key_to_address(DUMMY_SECRET_KEY)?)
    );

    Ok(())
}

#[test]
fn eip1559_signature_matches_hardhat() -> anyhow::Result<()> {
    let mut transaction = Transaction::new(
        TransactionType::Eip1559,
        EnvelopeParts {
            max_priority_fee_per_gas: Some(U256::from(2)),
            max_fee_per_gas: Some(U256::from(5)),
            ..dummy_parts()
        },
    );
    transaction.sign(&secret_key_bytes(DUMMY_SECRET_KEY)?, false)?;

    // Generated by Hardhat
    assert_eq!(
        hex::encode(transaction.encode(EncodeType::Transaction)),
        "02f8be010102050394c014ba5ec014ba5ec014ba5ec014ba5ec014ba5e04821234f85bf859940000000000000000000000000000000000000000f842a00000000000000000000000000000000000000000000000000000000000000000a0000000000000000000000000000000000000000000000000000000000000000101a07764e376b5b4090264f73abee68ebb5fdc9f76050eff800237e5a2bedadcd7eda044c0ae9b07c75cf4e0a14aebfe792ab2fdccd7d89550b166b1b4a4ece0054f02"
    );
    assert_eq!(
        transaction.hash(),
        b256!("0x043d6f6de2e81af3f48d6c64d4cdfc7576f8754c73569bc6903e50f3c92988d8")
    );

    Ok(())
}

#[test]
fn can_recover_sender() -> anyhow::Result<()> {
    // Generated based on
    // "f85f800182520894095e7baea6a6c7c4c2dfeb977efac326af552d870a801ba048b55bfa915ac795c431978d8a6a992b628d557da5ff759b307d495a36649353a0efffd310ac743f371de3b9f7f9cb56c0b28ad43601b4ab949f53faa07bd2c804"
    // but with a normalized signature
    let transaction = Transaction::decode(&hex::decode(
        "f85f800182520894095e7baea6a6c7c4c2dfeb977efac326af552d870a801ca048b55bfa915ac795c431978d8a6a992b628d557da5ff759b307d495a36649353a010002cef538bc0c8e21c46080634a93e082408b0ad93f4a7207e63ec5463793d",
    )?)?;

    assert_eq!(transaction.transaction_type(), TransactionType::Legacy);
    assert_eq!(transaction.chain_id(), None);
    assert_eq!(transaction.input(), &Bytes::new());
    assert_eq!(transaction.gas_price(), Some(U256::from(1)));
    assert_eq!(*transaction.gas_limit(), U256::from(0x5208));
    assert_eq!(*transaction.nonce(), U256::ZERO);
    assert_eq!(
        transaction.to(),
        Some(&address!("0x095e7baea6a6c7c4c2dfeb977efac326af552d87"))
    );
    assert_eq!(*transaction.value(), U256::from(0x0a));
    assert_eq!(
        transaction.sender(),
        Some(address!("0x0f65fe9276bc9a24ae7083ae28e2660ef72df99e"))
    );

    Ok(())
}

#[test]
fn decode_multiple_networks() -> anyhow::Result<()> {
    for (raw, chain_id, nonce, sender) in [
        (
            "f86b02843b9aca00830186a094d3e8763675e4c425df46cc3b5c0f6cbdac39604687038d7ea4c68000802ba00eb96ca19e8a77102767a41fc85a36afd5c61ccb09911cec5d3e86e193d9c5aea03a456401896b1b6055311536bf00a718568c744d8c1f9df59879e8350220ca18",
            4u64,
            2u64,
            address!("0x2efc0b963da6f672254b4e5eea754551fe191fd6"),
        ),
        (
            "f86b01843b9aca00830186a094d3e8763675e4c425df46cc3b5c0f6cbdac3960468702769bb01b2a00802ba0e24d8bd32ad906d6f8b8d7741e08d1959df021698b19ee232feba15361587d0aa05406ad177223213df262cb66ccbb2f46bfdccfdfbbb5ffdda9e2c02d977631da",
            4,
            1,
            address!("0x2efc0b963da6f672254b4e5eea754551fe191fd6"),
        ),
        (
            "f86b0384773594008398968094d3e8763675e4c425df46cc3b5c0f6cbdac39604687038d7ea4c68000802ba0ce6834447c0a4193c40382e6c57ae33b241379c5418caac9cdc18d786fd12071a03ca3ae86580e94550d7c071e3a02eadb5a77830947c9225165cf9100901bee88",
            4,
            3,
            address!("0x2efc0b963da6f672254b4e5eea754551fe191fd6"),
        ),
        (
            "02f872041a8459682f008459682f0d8252089461815774383099e24810ab832a5b2a5425c154d58829a2241af62c000080c001a059e6b67f48fb32e7e570dfb11e042b5ad2e55e3ce3ce9cd989c7e06e07feeafda0016b83f4f980694ed2eee4d10667242b1f40dc406901b34125b008d334d47469",
            4,
            26,
            address!("0x9421de2177f0e810ca1d69a040a2169f8c7c8e4b"),
        ),
        (
            "f8650f84832156008287fb94cf7f9e66af820a19257a2108375b180b0ec491678204d2802ca035b7bfeb9ad9ece2cbafaaf8e202e706b4cfaeb233f46198f00b44d4a566a981a0612638fb29427ca33b9a3be2a0a561beecfe0269655be160d35e72d366a6a860",
            4,
            15,
            address!("0xd35bd31431b33b756f965af3c62776354d6e4bd8"),
        ),
    ] {
        let raw = hex::decode(raw)?;
        let transaction = Transaction::decode(&raw)?;

        assert_eq!(transaction.chain_id(), Some(U256::from(chain_id)));
        assert_eq!(*transaction.nonce(), U256::from(nonce));
        assert_eq!(transaction.sender(), Some(sender));
        assert_eq!(transaction.encode(EncodeType::Transaction), Bytes::from(raw));
    }

    Ok(())
}

// <https://github.com/gakonst/ethers-rs/issues/1732>
#[test]
fn recover_legacy_transaction_with_calldata() -> anyhow::Result<()> {
    let raw = "f9015482078b8505d21dba0083022ef1947a250d5630b4cf539739df2c5dacb4c659f2488d880c46549a521b13d8b8e47ff36ab50000000000000000000000000000000000000000000066ab5a608bd00a23f2fe000000000000000000000000000000000000000000000000000000000000008000000000000000000000000048c04ed5691981c42154c6167398f95e8f38a7ff00000000000000000000000000000000000000000000000000000000632ceac70000000000000000000000000000000000000000000000000000000000000002000000000000000000000000c02aaa39b223fe8d0a0e5c4f27ead9083c756cc20000000000000000000000006c6ee5e31d828de241282b9606c8e98ea48526e225a0c9077369501641a92ef7399ff81c21639ed4fd8fc69cb793cfa1dbfab342e10aa0615facb2f1bcf3274a354cfe384a38d0cc008a11c2dd23a69111bc6930ba27a8";

    let transaction = Transaction::decode(&hex::decode(raw)?)?;
    assert_eq!(
        transaction.sender(),
        Some(address!("0xa12e1462d0ced572f396f58b6e2d03894cd7c8a4"))
    );

    Ok(())
}

#[test]
fn legacy_transfer_on_mainnet() -> anyhow::Result<()> {
    let mut transaction = Transaction::new(
        TransactionType::Legacy,
        EnvelopeParts {
            chain_id: Some(U256::from(1)),
            nonce: U256::ZERO,
            kind: TxKind::Call(address!("0x000000000000000000000000000000000000dead")),
            value: U256::from(1_000_000_000_000_000_000u64),
            gas_price: Some(U256::from(20_000_000_000u64)),
            gas_limit: U256::from(21_000),
            ..EnvelopeParts::default()
        },
    );

    for secret_key in SECRET_KEYS {
        transaction.sign(&secret_key_bytes(secret_key)?, true)?;

        let v = *transaction.v();
        assert!(v == U256::from(37) || v == U256::from(38), "v = {v}");
        assert_eq!(transaction.chain_id(), Some(U256::from(1)));

        let signature = transaction
            .envelope()
            .unmarshalled_signature()
            .expect("transaction is signed");
        assert!(signature.v <= 1);

        let raw = transaction.encode(EncodeType::Transaction);
        assert!(raw.first().is_some_and(|&byte| byte >= 0xc0));
        assert_eq!(ethtx_rlp::decode(&raw)?.into_list()?.len(), 9);

        assert_eq!(transaction.sender(), Some(secret_key_to_address(secret_key)?));
    }

    Ok(())
}

#[test]
fn legacy_chain_id_round_trips_through_v() -> anyhow::Result<()> {
    for chain_id in [1u64, 5, 1337, 31_337, 11_155_111] {
        let mut transaction = Transaction::new(
            TransactionType::Legacy,
            EnvelopeParts {
                chain_id: Some(U256::from(chain_id)),
                ..EnvelopeParts::default()
            },
        );
        transaction.sign(&secret_key_bytes(SECRET_KEYS[1])?, false)?;

        let offset = U256::from(35 + 2 * chain_id);
        assert!(*transaction.v() == offset || *transaction.v() == offset + U256::from(1));

        let decoded = Transaction::decode(&transaction.encode(EncodeType::Transaction))?;
        assert_eq!(decoded.chain_id(), Some(U256::from(chain_id)));
    }

    Ok(())
}

#[test]
fn reserved_type_byte_fails() -> anyhow::Result<()> {
    let mut transaction = Transaction::new(TransactionType::Eip1559, dummy_parts());
    transaction.sign(&secret_key_bytes(SECRET_KEYS[0])?, false)?;

    let mut raw = transaction.encode(EncodeType::Transaction).to_vec();
    raw[0] = 0xff;

    assert_eq!(Transaction::decode(&raw), Err(DecodeError::ReservedType));

    Ok(())
}

#[test]
fn migrating_signed_legacy_transaction_unsigns_it() -> anyhow::Result<()> {
    let mut transaction = Transaction::new(
        TransactionType::Legacy,
        EnvelopeParts {
            chain_id: Some(U256::from(1)),
            gas_price: Some(U256::from(20)),
            ..dummy_parts()
        },
    );
    transaction.sign(&secret_key_bytes(SECRET_KEYS[2])?, false)?;
    assert!(transaction.is_signed());

    transaction.migrate(TransactionType::Eip1559);

    assert_eq!(transaction.transaction_type(), TransactionType::Eip1559);
    assert_eq!(*transaction.r(), U256::ZERO);
    assert_eq!(*transaction.s(), U256::ZERO);
    assert_eq!(transaction.sender(), None);
    assert_eq!(transaction.chain_id(), Some(U256::from(1)));
    assert_eq!(transaction.max_fee_per_gas(), Some(U256::from(20)));
    assert_eq!(transaction.input(), &Bytes::from_static(&[0x12, 0x34]));

    Ok(())
}

#[test]
fn unsign_is_idempotent() -> anyhow::Result<()> {
    for transaction_type in [
        TransactionType::Legacy,
        TransactionType::Eip2930,
        TransactionType::Eip1559,
    ] {
        let mut transaction = Transaction::new(transaction_type, dummy_parts());
        transaction.sign(&secret_key_bytes(SECRET_KEYS[0])?, false)?;

        transaction.unsign();
        transaction.unsign();

        assert_eq!(*transaction.v(), U256::from(1));
        assert_eq!(*transaction.r(), U256::ZERO);
        assert_eq!(*transaction.s(), U256::ZERO);
        assert_eq!(transaction.chain_id(), Some(U256::from(1)));
    }

    Ok(())
}

#[test]
fn signing_with_invalid_key_fails() {
    let mut transaction = Transaction::new(TransactionType::Eip2930, dummy_parts());

    assert!(matches!(
        transaction.sign(&[0xff; 32], false),
        Err(SignError::Signature(_))
    ));
    assert!(matches!(
        transaction.sign(&[0x01; 16], false),
        Err(SignError::Signature(_))
    ));
}

#[test]
fn decode_rejects_access_list_with_short_storage_key() -> anyhow::Result<()> {
    let mut transaction = Transaction::new(TransactionType::Eip2930, dummy_parts());
    transaction.sign(&secret_key_bytes(SECRET_KEYS[0])?, false)?;

    let raw = transaction.encode(EncodeType::Transaction);
    let (_type, payload) = raw.split_at(1);
    let mut fields = ethtx_rlp::decode(payload)?.into_list()?;

    // Replace the access list with one whose storage key is 31 bytes.
    fields[7] = Item::List(vec![Item::List(vec![
        Item::Bytes(Bytes::from(Address::ZERO.to_vec())),
        Item::List(vec![Item::Bytes(Bytes::from(vec![0u8; 31]))]),
    ])]);

    let mut tampered = vec![0x01];
    alloy_rlp::Encodable::encode(&Item::List(fields), &mut tampered);

    assert!(matches!(
        Transaction::decode(&tampered),
        Err(DecodeError::Rlp(alloy_rlp::Error::Custom(_)))
    ));

    Ok(())
}

#[test]
fn json_round_trip_captures_metadata() -> anyhow::Result<()> {
    let raw = hex::decode(
        "02f872041a8459682f008459682f0d8252089461815774383099e24810ab832a5b2a5425c154d58829a2241af62c000080c001a059e6b67f48fb32e7e570dfb11e042b5ad2e55e3ce3ce9cd989c7e06e07feeafda0016b83f4f980694ed2eee4d10667242b1f40dc406901b34125b008d334d47469",
    )?;
    let expected = Transaction::decode(&raw)?;

    let transaction = Transaction::from_json(&format!(
        r#"{{
            "type": "0x2",
            "chainId": "0x4",
            "nonce": "0x1a",
            "to": "0x61815774383099e24810ab832a5b2a5425c154d5",
            "value": "0x29a2241af62c0000",
            "gas": "0x5208",
            "maxPriorityFeePerGas": "0x59682f00",
            "maxFeePerGas": "0x59682f0d",
            "input": "0x",
            "accessList": [],
            "v": "0x1",
            "r": "0x59e6b67f48fb32e7e570dfb11e042b5ad2e55e3ce3ce9cd989c7e06e07feeafd",
            "s": "0x16b83f4f980694ed2eee4d10667242b1f40dc406901b34125b008d334d47469",
            "blockHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber": "0x1",
            "transactionIndex": "0x0",
            "hash": "{}"
        }}"#,
        expected.hash()
    ))?;

    assert_eq!(transaction.envelope(), expected.envelope());
    assert_eq!(
        transaction.sender(),
        Some(address!("0x9421de2177f0e810ca1d69a040a2169f8c7c8e4b"))
    );

    let metadata = transaction.metadata().expect("metadata is captured");
    assert_eq!(metadata.transaction_hash, Some(transaction.hash()));
    assert_eq!(metadata.block_number, Some(U256::from(1)));

    Ok(())
}

#[test]
fn json_without_type_is_legacy() -> anyhow::Result<()> {
    let transaction = Transaction::from_json(
        r#"{
            "nonce": "0x0",
            "to": null,
            "value": "0x0",
            "gasLimit": "0x7a120",
            "gasPrice": "0x1",
            "data": "0x6080",
            "v": "0x1",
            "r": "0x0",
            "s": "0x0"
        }"#,
    )?;

    assert_eq!(transaction.transaction_type(), TransactionType::Legacy);
    assert_eq!(transaction.to(), None);
    assert_eq!(*transaction.gas_limit(), U256::from(500_000));
    assert_eq!(transaction.input(), &Bytes::from_static(&[0x60, 0x80]));
    assert!(!transaction.is_signed());
    assert!(transaction.metadata().is_none());

    Ok(())
}

#[test]
fn json_missing_required_field_fails() {
    let error = Transaction::from_json(
        r#"{
            "type": "0x1",
            "nonce": "0x0",
            "to": "0x000000000000000000000000000000000000dead",
            "value": "0x0",
            "input": "0x",
            "v": "0x0",
            "r": "0x0",
            "s": "0x0"
        }"#,
    )
    .expect_err("chain ID is missing");

    assert!(error.to_string().contains("chainId"));
}
