use dbdoc_bson::{
    subtype, BsonBinary, BsonDbPointer, BsonDecimal128, BsonDecoder, BsonEncoder, BsonError,
    BsonJavascriptCode, BsonJavascriptCodeWithScope, BsonObjectId, BsonSymbol, BsonTimestamp,
    BsonValue,
};
use proptest::prelude::*;

fn doc(fields: &[(&str, BsonValue)]) -> Vec<(String, BsonValue)> {
    fields
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

#[test]
fn bson_reference_wire_examples() {
    let encoder = BsonEncoder::new();

    // {"hello": "world"}
    let hello = encoder
        .encode(&doc(&[("hello", BsonValue::Str("world".into()))]))
        .unwrap();
    assert_eq!(
        hello,
        b"\x16\x00\x00\x00\x02hello\x00\x06\x00\x00\x00world\x00\x00".to_vec()
    );

    // {"BSON": ["awesome", 5.05, 1986]}
    let awesome = encoder
        .encode(&doc(&[(
            "BSON",
            BsonValue::Array(vec![
                BsonValue::Str("awesome".into()),
                BsonValue::Float(5.05),
                BsonValue::Int32(1986),
            ]),
        )]))
        .unwrap();
    let expected: Vec<u8> = [
        &b"\x31\x00\x00\x00\x04BSON\x00\x26\x00\x00\x00"[..],
        &b"\x020\x00\x08\x00\x00\x00awesome\x00"[..],
        &b"\x011\x00\x33\x33\x33\x33\x33\x33\x14\x40"[..],
        &b"\x102\x00\xc2\x07\x00\x00"[..],
        &b"\x00\x00"[..],
    ]
    .concat();
    assert_eq!(awesome, expected);
}

#[test]
fn bson_every_type_roundtrip_matrix() {
    let oid = BsonObjectId {
        timestamp: 0x6500_0000,
        process: 0x12_3456_789a,
        counter: 0x00bc_def0,
    };
    let fields = doc(&[
        ("double", BsonValue::Float(-1.5)),
        ("string", BsonValue::Str("héllo".into())),
        (
            "document",
            BsonValue::Document(doc(&[("inner", BsonValue::Boolean(true))])),
        ),
        (
            "array",
            BsonValue::Array(vec![BsonValue::Int32(1), BsonValue::Array(vec![])]),
        ),
        ("binary", BsonValue::Binary(BsonBinary::new(vec![1, 2, 3]))),
        (
            "old_binary",
            BsonValue::Binary(BsonBinary {
                subtype: subtype::OLD_BINARY,
                data: vec![9, 9],
            }),
        ),
        ("undefined", BsonValue::Undefined),
        ("oid", BsonValue::ObjectId(oid)),
        ("bool", BsonValue::Boolean(false)),
        ("date", BsonValue::DateTime(1_700_000_000_000)),
        ("null", BsonValue::Null),
        ("regex", BsonValue::Regex("^a.*".into(), "i".into())),
        (
            "pointer",
            BsonValue::DbPointer(BsonDbPointer {
                name: "db.coll".into(),
                id: oid,
            }),
        ),
        (
            "code",
            BsonValue::JavaScriptCode(BsonJavascriptCode {
                code: "function() {}".into(),
            }),
        ),
        (
            "symbol",
            BsonValue::Symbol(BsonSymbol {
                symbol: "sym".into(),
            }),
        ),
        (
            "scoped",
            BsonValue::JavaScriptCodeWithScope(BsonJavascriptCodeWithScope {
                code: "x + y".into(),
                scope: doc(&[
                    ("x", BsonValue::Int32(1)),
                    ("y", BsonValue::Document(doc(&[("z", BsonValue::Null)]))),
                ]),
            }),
        ),
        ("int32", BsonValue::Int32(i32::MIN)),
        (
            "timestamp",
            BsonValue::Timestamp(BsonTimestamp {
                increment: 7,
                timestamp: 1_600_000_000,
            }),
        ),
        ("int64", BsonValue::Int64(i64::MAX)),
        (
            "decimal",
            BsonValue::Decimal128(BsonDecimal128 {
                data: (0u8..16).collect(),
            }),
        ),
        ("min", BsonValue::MinKey),
        ("max", BsonValue::MaxKey),
    ]);

    let bytes = BsonEncoder::new().encode(&fields).unwrap();
    let decoded = BsonDecoder::new().decode(&bytes).unwrap();
    assert_eq!(decoded, fields);
}

#[test]
fn bson_decoder_error_matrix() {
    let decoder = BsonDecoder::new();
    assert_eq!(decoder.decode(&[]), Err(BsonError::UnexpectedEof));
    assert_eq!(decoder.decode(&[5, 0, 0]), Err(BsonError::UnexpectedEof));
    assert_eq!(
        decoder.decode(&[4, 0, 0, 0]),
        Err(BsonError::InvalidSize(4))
    );
    assert!(matches!(
        decoder.decode(&[5, 0, 0, 0, 0, 0xff]),
        Err(BsonError::InvalidState(_))
    ));
    // String whose declared length runs past the document.
    let bad_string = b"\x0f\x00\x00\x00\x02a\x00\x40\x00\x00\x00ab\x00\x00";
    assert_eq!(decoder.decode(bad_string), Err(BsonError::UnexpectedEof));
    // Invalid UTF-8 in a field name.
    let bad_name = b"\x08\x00\x00\x00\x0a\xff\x00\x00";
    assert_eq!(decoder.decode(bad_name), Err(BsonError::InvalidUtf8));
}

#[test]
fn bson_encoder_rejects_invalid_values() {
    let encoder = BsonEncoder::new();
    let short_decimal = doc(&[(
        "d",
        BsonValue::Decimal128(BsonDecimal128 { data: vec![0; 3] }),
    )]);
    assert!(matches!(
        encoder.encode(&short_decimal),
        Err(BsonError::InvalidValue(_))
    ));
    let nul_key = doc(&[("a\0", BsonValue::Null)]);
    assert!(matches!(
        encoder.encode(&nul_key),
        Err(BsonError::InvalidValue(_))
    ));
}

fn arb_leaf() -> impl Strategy<Value = BsonValue> {
    prop_oneof![
        Just(BsonValue::Null),
        any::<bool>().prop_map(BsonValue::Boolean),
        any::<i32>().prop_map(BsonValue::Int32),
        any::<i64>().prop_map(BsonValue::Int64),
        (-1.0e12f64..1.0e12).prop_map(BsonValue::Float),
        "[a-z0-9 ]{0,12}".prop_map(BsonValue::Str),
        proptest::collection::vec(any::<u8>(), 0..16)
            .prop_map(|data| BsonValue::Binary(BsonBinary::new(data))),
    ]
}

fn arb_value() -> impl Strategy<Value = BsonValue> {
    arb_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(BsonValue::Array),
            proptest::collection::vec(("[a-z]{1,6}", inner), 0..6)
                .prop_map(BsonValue::Document),
        ]
    })
}

proptest! {
    #[test]
    fn bson_roundtrip_property(fields in proptest::collection::vec(("[a-z_]{1,8}", arb_value()), 0..8)) {
        let bytes = BsonEncoder::new().encode(&fields).unwrap();
        let decoded = BsonDecoder::new().decode(&bytes).unwrap();
        prop_assert_eq!(decoded, fields);
    }
}
