//! Tests for the public encode/decode API.
//!
//! These complement the RFC 8949 vector suite with encoder-side byte
//! expectations, width boundaries, bignum handling and the value model.

use cborpack::bignum::{bytes_to_unsigned, unsigned_to_bytes};
use cborpack::header::{decode_header, write_header};
use cborpack::*;
use num_bigint::{BigInt, BigUint};

fn enc(v: impl Into<Value>) -> Vec<u8> {
    encode(&v.into()).unwrap()
}

fn roundtrip(v: &Value) -> Value {
    decode(&encode(v).unwrap()).unwrap()
}

// ── Literal encodings ───────────────────────────────────────

#[test]
fn encode_small_integers() {
    assert_eq!(enc(0), vec![0x00]);
    assert_eq!(enc(23), vec![0x17]);
    assert_eq!(enc(24), vec![0x18, 0x18]);
    assert_eq!(enc(-1), vec![0x20]);
    assert_eq!(enc(1000), vec![0x19, 0x03, 0xE8]);
}

#[test]
fn encode_array_of_ints() {
    let v = Value::from(vec![Value::from(1), Value::from(2), Value::from(3)]);
    assert_eq!(encode(&v).unwrap(), vec![0x83, 0x01, 0x02, 0x03]);
}

#[test]
fn decode_single_pair_map() {
    let v = decode(&[0xA1, 0x01, 0x02]).unwrap();
    assert_eq!(v, Value::Map(vec![(Value::from(1), Value::from(2))]));
}

#[test]
fn decode_bignum_256() {
    let v = decode(&[0xC2, 0x42, 0x01, 0x00]).unwrap();
    assert_eq!(v, Value::from(256));
    assert_eq!(v.as_i128(), Some(256));
}

#[test]
fn encode_simple_values() {
    assert_eq!(encode(&Value::Null).unwrap(), vec![0xF6]);
    assert_eq!(enc(true), vec![0xF5]);
    assert_eq!(enc(false), vec![0xF4]);
}

#[test]
fn float_always_64_bit() {
    assert_eq!(
        enc(1.5f64),
        vec![0xFB, 0x3F, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
    // Even values that fit a narrower float.
    assert_eq!(enc(0.0f64).len(), 9);
    assert_eq!(enc(1.5f32).len(), 9);
}

#[test]
fn strings_use_definite_lengths() {
    assert_eq!(enc("IETF"), vec![0x64, b'I', b'E', b'T', b'F']);
    assert_eq!(enc(&b"\x01\x02"[..]), vec![0x42, 0x01, 0x02]);
    let long = "x".repeat(24);
    let bytes = enc(long.as_str());
    assert_eq!(&bytes[..2], &[0x78, 24]);
    assert_eq!(bytes.len(), 26);
}

#[test]
fn map_pairs_keep_caller_order() {
    let v = Value::Map(vec![
        (Value::from("b"), Value::from(1)),
        (Value::from("a"), Value::from(2)),
    ]);
    assert_eq!(
        encode(&v).unwrap(),
        vec![0xA2, 0x61, b'b', 0x01, 0x61, b'a', 0x02]
    );
}

#[test]
fn tagged_value_encodes_header_then_payload() {
    let v = Value::tagged(32, Value::from("http://a"));
    let bytes = encode(&v).unwrap();
    assert_eq!(&bytes[..3], &[0xD8, 0x20, 0x68]);
    assert_eq!(roundtrip(&v), v);
}

#[test]
fn encode_into_appends() {
    let mut out = vec![0xAA];
    encode_into(&Value::from(1), &mut out).unwrap();
    assert_eq!(out, vec![0xAA, 0x01]);
}

// ── Minimal width boundaries ────────────────────────────────

#[test]
fn unsigned_width_boundaries() {
    let cases: &[(u64, usize)] = &[
        (23, 1),
        (24, 2),
        (255, 2),
        (256, 3),
        (65_535, 3),
        (65_536, 5),
        (4_294_967_295, 5),
        (4_294_967_296, 9),
        (u64::MAX, 9),
    ];
    for &(n, len) in cases {
        let bytes = enc(n);
        assert_eq!(bytes.len(), len, "encode({}) width", n);
        assert_eq!(decode(&bytes).unwrap(), Value::from(n));
    }
}

#[test]
fn negative_width_boundaries() {
    assert_eq!(enc(-24), vec![0x37]);
    assert_eq!(enc(-25), vec![0x38, 0x18]);
    assert_eq!(enc(-256), vec![0x38, 0xFF]);
    assert_eq!(enc(-257), vec![0x39, 0x01, 0x00]);
    let min_native = -(1i128 << 64);
    assert_eq!(enc(min_native), vec![0x3B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn overlong_headers_are_accepted() {
    assert_eq!(decode(&[0x19, 0x00, 0x01]).unwrap(), Value::from(1));
    assert_eq!(decode(&[0x78, 0x01, b'a']).unwrap(), Value::from("a"));
}

// ── Bignums ─────────────────────────────────────────────────

#[test]
fn two_pow_64_uses_tag_2() {
    let n = 1u128 << 64;
    let bytes = enc(n);
    assert_eq!(
        bytes,
        vec![0xC2, 0x49, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(decode(&bytes).unwrap(), Value::from(n));
}

#[test]
fn below_native_range_uses_tag_3() {
    let n = -(1i128 << 64) - 1;
    let bytes = enc(n);
    assert_eq!(
        bytes,
        vec![0xC3, 0x49, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(decode(&bytes).unwrap(), Value::from(n));
}

#[test]
fn bignum_beyond_i128_roundtrips() {
    let big: BigInt = BigInt::from(1u8) << 200usize;
    let pos = Value::from(big.clone());
    assert!(matches!(pos, Value::BigNum(_)));
    assert_eq!(roundtrip(&pos), pos);

    let neg = Value::from(-big - 12345);
    assert_eq!(roundtrip(&neg), neg);
    assert_eq!(encode(&neg).unwrap()[0], 0xC3);
}

#[test]
fn bignum_variant_in_native_range_uses_native_header() {
    let v = Value::BigNum(BigInt::from(1000));
    assert_eq!(encode(&v).unwrap(), vec![0x19, 0x03, 0xE8]);
    assert_eq!(roundtrip(&v), Value::from(1000));
}

#[test]
fn integer_variants_compare_by_value() {
    assert_eq!(Value::Integer(7), Value::BigNum(BigInt::from(7)));
    assert_ne!(Value::Integer(7), Value::Float(7.0));
    assert_eq!(Value::from(BigInt::from(-3)), Value::Integer(-3));
}

#[test]
fn bignum_codec_convention() {
    assert!(unsigned_to_bytes(&BigUint::from(0u8)).is_empty());
    assert_eq!(unsigned_to_bytes(&BigUint::from(256u32)), vec![0x01, 0x00]);
    assert_eq!(bytes_to_unsigned(&[]), BigUint::from(0u8));
    assert_eq!(bytes_to_unsigned(&[0x00, 0x01, 0x00]), BigUint::from(256u32));
}

#[test]
fn uninterpreted_bignum_stays_tagged() {
    let opts = DecodeOptions {
        interpret_tags: false,
        ..DecodeOptions::default()
    };
    let v = decode_with(&[0xC2, 0x42, 0x01, 0x00], &opts).unwrap();
    assert_eq!(v, Value::tagged(2, Value::from(&[0x01u8, 0x00][..])));
}

// ── Header codec ────────────────────────────────────────────

#[test]
fn header_write_and_read() {
    let mut out = Vec::new();
    write_header(&mut out, 4, 500);
    assert_eq!(out, vec![0x99, 0x01, 0xF4]);

    let hdr = decode_header(&out, 0).unwrap();
    assert_eq!(hdr.major, 4);
    assert_eq!(hdr.info, 25);
    assert_eq!(hdr.aux, Some(500));
    assert_eq!(hdr.len, 3);
    assert!(!hdr.is_indefinite());
}

#[test]
fn header_indefinite_marker() {
    let hdr = decode_header(&[0x00, 0x9F], 1).unwrap();
    assert_eq!(hdr.major, 4);
    assert!(hdr.is_indefinite());
    assert_eq!(hdr.len, 1);
}

#[test]
fn header_reserved_info_rejected() {
    for b in [0x1C, 0x1D, 0x1E] {
        let err = decode_header(&[b], 0).unwrap_err();
        assert_eq!(err.code(), ERR_MALFORMED);
    }
}

// ── Round trips over the value model ────────────────────────

#[test]
fn mixed_document_roundtrips() {
    let v = Value::Map(vec![
        (Value::from("id"), Value::from(42)),
        (Value::from("blob"), Value::from(&[0u8, 1, 2, 255][..])),
        (
            Value::from("items"),
            Value::from(vec![
                Value::Null,
                Value::from(true),
                Value::from(-1.25),
                Value::from("ü水"),
                Value::from(u64::MAX),
            ]),
        ),
        (Value::from(3), Value::tagged(9999, Value::from("x"))),
        (Value::from(vec![Value::from(1)]), Value::Map(vec![])),
    ]);
    assert_eq!(roundtrip(&v), v);
}

#[test]
fn text_and_bytes_stay_distinct() {
    let text = roundtrip(&Value::from("ab"));
    let bytes = roundtrip(&Value::from(&b"ab"[..]));
    assert_eq!(text.as_str(), Some("ab"));
    assert_eq!(bytes.as_bytes(), Some(&b"ab"[..]));
    assert_ne!(text, bytes);
}

#[test]
fn map_lookup() {
    let v = decode(&[0xA2, 0x61, b'a', 0x01, 0x61, b'b', 0x02]).unwrap();
    assert_eq!(v.get(&Value::from("b")), Some(&Value::from(2)));
    assert_eq!(v.get(&Value::from("z")), None);
}

#[test]
fn undefined_decodes_as_null() {
    assert!(decode(&[0xF7]).unwrap().is_null());
}

// ── Prefix decoding ─────────────────────────────────────────

#[test]
fn decode_prefix_reports_consumed() {
    let buf = [0x19, 0x03, 0xE8, 0x01, 0x02];
    let (v, n) = decode_prefix(&buf).unwrap();
    assert_eq!(v, Value::from(1000));
    assert_eq!(n, 3);

    let (v, n) = decode_prefix(&buf[n..]).unwrap();
    assert_eq!(v, Value::from(1));
    assert_eq!(n, 1);
}

#[test]
fn trailing_bytes_rejected_by_decode() {
    let err = decode(&[0x01, 0x02]).unwrap_err();
    assert_eq!(err.code(), ERR_MALFORMED);
    assert_eq!(err.offset(), Some(1));
}

// ── Errors ──────────────────────────────────────────────────

#[test]
fn encoder_rejects_duplicate_map_keys() {
    let v = Value::Map(vec![
        (Value::from("a"), Value::from(1)),
        (Value::from("a"), Value::from(2)),
    ]);
    let err = encode(&v).unwrap_err();
    assert_eq!(err.code(), ERR_UNSUPPORTED_VALUE);
    assert_eq!(err.offset(), None);
}

#[test]
fn encoder_treats_equal_integers_as_duplicate_keys() {
    let v = Value::Map(vec![
        (Value::Integer(5), Value::Null),
        (Value::BigNum(BigInt::from(5)), Value::Null),
    ]);
    assert_eq!(encode(&v).unwrap_err().code(), ERR_UNSUPPORTED_VALUE);
}

#[test]
fn encoder_compares_keys_as_they_decode() {
    // A tag-2 bignum key reads back as the plain integer 256.
    let v = Value::Map(vec![
        (Value::from(256), Value::from(1)),
        (Value::tagged(2, Value::from(&[0x01u8, 0x00][..])), Value::from(2)),
    ]);
    assert_eq!(encode(&v).unwrap_err().code(), ERR_UNSUPPORTED_VALUE);

    // An epoch tag key reads back as a timestamp.
    let v = Value::Map(vec![
        (Value::Timestamp(Timestamp::from_secs(0)), Value::Null),
        (Value::tagged(1, Value::from(0)), Value::Null),
    ]);
    assert_eq!(encode(&v).unwrap_err().code(), ERR_UNSUPPORTED_VALUE);

    // Same inside a compound key.
    let v = Value::Map(vec![
        (Value::from(vec![Value::from(256)]), Value::Null),
        (
            Value::from(vec![Value::tagged(2, Value::from(&[0x01u8, 0x00][..]))]),
            Value::Null,
        ),
    ]);
    assert_eq!(encode(&v).unwrap_err().code(), ERR_UNSUPPORTED_VALUE);

    // Unknown tags are kept, so they stay distinct from their payload.
    let v = Value::Map(vec![
        (Value::from(7), Value::Null),
        (Value::tagged(1000, Value::from(7)), Value::Null),
    ]);
    let bytes = encode(&v).unwrap();
    assert_eq!(decode(&bytes).unwrap(), v);
}

#[test]
fn half_float_rejected() {
    let err = decode(&[0xF9, 0x3C, 0x00]).unwrap_err();
    assert!(matches!(err, CborError::UnsupportedFeature { offset: 0, .. }));
}

#[test]
fn error_messages_name_the_offset() {
    let err = decode(&[0x82, 0x01, 0x1C]).unwrap_err();
    assert_eq!(err.offset(), Some(2));
    assert!(err.to_string().contains("offset 2"), "{}", err);
}

// ── Concurrency ─────────────────────────────────────────────

#[test]
fn independent_calls_run_in_parallel() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let v = Value::from(vec![Value::from(i), Value::from(format!("t{}", i))]);
                assert_eq!(roundtrip(&v), v);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
