// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use hex_literal::hex;
use rstest::rstest;
use weft_codec::{
    CodecError, CodecOptions, Decoded, Decoder, Value, deserialize, deserialize_from_reader,
    serialize, wire_object,
};

#[derive(Debug, PartialEq)]
struct Sample {
    reading: Option<i32>,
    count: i32,
}

wire_object!(Sample {
    reading: Option<i32>,
    count: i32,
});

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

wire_object!(Point {
    #[index = 1] x: i32,
    #[index = 0] y: i32,
});

#[derive(Debug, PartialEq)]
struct Tree {
    label: String,
    children: Vec<Tree>,
}

wire_object!(Tree {
    label: String,
    children: Vec<Tree>,
});

#[test]
fn int32_is_four_little_endian_bytes() {
    let options = CodecOptions::default();
    let bytes = serialize(&-123456i32, &options).unwrap();
    assert_eq!(&bytes[..], hex!("c0 1d fe ff"));
    assert_eq!(deserialize::<i32>(&bytes, &options).unwrap(), -123456);
}

#[test]
fn list_resumes_after_partial_input() {
    let options = CodecOptions::default();
    let bytes = serialize(&vec![1i32, 2, 3], &options).unwrap();
    assert_eq!(
        &bytes[..],
        hex!("01 03000000 01000000 02000000 03000000")
    );

    let mut decoder = Decoder::<Vec<i32>>::new(&options).unwrap();
    assert_eq!(
        decoder.decode(&bytes[..9]).unwrap(),
        Decoded::Incomplete {
            consumed: 9,
            needed: 4
        }
    );
    assert!(decoder.in_progress());
    assert_eq!(
        decoder.decode(&bytes[9..]).unwrap(),
        Decoded::Complete {
            value: vec![1, 2, 3],
            consumed: 8
        }
    );
    assert!(!decoder.in_progress());
}

#[test]
fn null_field_sets_its_flag_and_writes_nothing() {
    let options = CodecOptions::default();
    let sample = Sample {
        reading: None,
        count: 7,
    };
    let bytes = serialize(&sample, &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 02000000 01 07000000"));
    assert_eq!(deserialize::<Sample>(&bytes, &options).unwrap(), sample);
}

#[test]
fn present_field_clears_its_flag() {
    let options = CodecOptions::default();
    let sample = Sample {
        reading: Some(-1),
        count: 0,
    };
    let bytes = serialize(&sample, &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 02000000 00 ffffffff 00000000"));
    assert_eq!(deserialize::<Sample>(&bytes, &options).unwrap(), sample);
}

#[test]
fn empty_string_is_not_null() {
    let options = CodecOptions::default();
    let bytes = serialize(&String::new(), &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 00000000"));
    assert_eq!(deserialize::<String>(&bytes, &options).unwrap(), "");

    let bytes = serialize(&Some(String::new()), &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 00000000"));
    let none = serialize(&None::<String>, &options).unwrap();
    assert_eq!(&none[..], hex!("00"));
    assert_eq!(deserialize::<Option<String>>(&none, &options).unwrap(), None);
    assert_eq!(
        deserialize::<Option<String>>(&bytes, &options).unwrap(),
        Some(String::new())
    );
}

#[test]
fn null_for_a_reference_type_is_rejected() {
    let options = CodecOptions::default();
    let err = deserialize::<String>(&hex!("00"), &options).unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedNull { .. }), "{err}");
    let err = deserialize::<Vec<u8>>(&hex!("00"), &options).unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedNull { .. }), "{err}");
}

#[test]
fn invalid_marker_is_rejected() {
    let err = deserialize::<String>(&hex!("07 00000000"), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::InvalidMarker { marker: 7 }), "{err}");
}

#[rstest]
#[case::list(serialize(&Vec::<i64>::new(), &CodecOptions::default()).unwrap().to_vec())]
#[case::map(serialize(&BTreeMap::<i32, String>::new(), &CodecOptions::default()).unwrap().to_vec())]
#[case::bytes(serialize(&bytes::Bytes::new(), &CodecOptions::default()).unwrap().to_vec())]
fn empty_collections_are_marker_and_zero_count(#[case] bytes: Vec<u8>) {
    assert_eq!(bytes, hex!("01 00000000"));
}

#[test]
fn map_entries_alternate_keys_and_values() {
    let options = CodecOptions::default();
    let map = BTreeMap::from([(1u8, "a".to_string()), (2, "bc".to_string())]);
    let bytes = serialize(&map, &options).unwrap();
    assert_eq!(
        &bytes[..],
        hex!("01 02000000 01 01 01000000 61 02 01 02000000 62 63")
    );
    assert_eq!(
        deserialize::<BTreeMap<u8, String>>(&bytes, &options).unwrap(),
        map
    );
}

#[test]
fn index_attribute_reorders_fields() {
    let point = Point { x: 1, y: 2 };

    let options = CodecOptions::default();
    let bytes = serialize(&point, &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 02000000 00 02000000 01000000"));
    assert_eq!(deserialize::<Point>(&bytes, &options).unwrap(), point);

    let options = CodecOptions::default().ignoring_index_attribute();
    let bytes = serialize(&point, &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 02000000 00 01000000 02000000"));
    assert_eq!(deserialize::<Point>(&bytes, &options).unwrap(), point);
}

#[test]
fn property_names_precede_each_field() {
    let options = CodecOptions::default().with_property_names();
    let point = Point { x: 1, y: 2 };
    let bytes = serialize(&point, &options).unwrap();
    assert_eq!(
        &bytes[..],
        hex!("01 02000000 00 01000000 79 02000000 01000000 78 01000000")
    );
    assert_eq!(deserialize::<Point>(&bytes, &options).unwrap(), point);
}

#[test]
fn property_names_match_fields_in_any_order() {
    let options = CodecOptions::default().with_property_names();
    let swapped = hex!("01 02000000 00 01000000 78 05000000 01000000 79 06000000");
    assert_eq!(
        deserialize::<Point>(&swapped, &options).unwrap(),
        Point { x: 5, y: 6 }
    );
}

#[test]
fn property_types_precede_each_value() {
    let options = CodecOptions::default().with_property_types();
    let sample = Sample {
        reading: None,
        count: 3,
    };
    let bytes = serialize(&sample, &options).unwrap();
    assert_eq!(
        &bytes[..],
        hex!("01 02000000 01 0200 2006 0100 06 03000000")
    );
    assert_eq!(deserialize::<Sample>(&bytes, &options).unwrap(), sample);
}

#[test]
fn recursive_types_round_trip() {
    let options = CodecOptions::default();
    let tree = Tree {
        label: "root".into(),
        children: vec![
            Tree {
                label: "a".into(),
                children: Vec::new(),
            },
            Tree {
                label: "b".into(),
                children: vec![Tree {
                    label: "c".into(),
                    children: Vec::new(),
                }],
            },
        ],
    };
    let bytes = serialize(&tree, &options).unwrap();
    assert_eq!(deserialize::<Tree>(&bytes, &options).unwrap(), tree);
}

#[test]
fn dynamic_values_carry_their_descriptor() {
    let options = CodecOptions::default();
    let bytes = serialize(&Value::I32(5), &options).unwrap();
    assert_eq!(&bytes[..], hex!("01 0100 06 05000000"));
    assert_eq!(deserialize::<Value>(&bytes, &options).unwrap(), Value::I32(5));

    assert_eq!(&serialize(&Value::Null, &options).unwrap()[..], hex!("00"));
    assert_eq!(deserialize::<Value>(&hex!("00"), &options).unwrap(), Value::Null);
}

#[test]
fn dynamic_lists_hold_mixed_values() {
    let options = CodecOptions::default();
    let value = Value::List(vec![
        Value::I32(1),
        Value::String("two".into()),
        Value::Null,
    ]);
    let bytes = serialize(&value, &options).unwrap();
    assert_eq!(deserialize::<Value>(&bytes, &options).unwrap(), value);
}

#[test]
fn unregistered_dynamic_object_is_unknown() {
    // The descriptor names an object type no factory has built.
    let bytes = hex!("01 0900 25 0600 4f7270 68616e");
    let err = deserialize::<Value>(&bytes, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::UnknownType(ref name) if name == "Orphan"), "{err}");
}

#[test]
fn collection_over_the_limit_is_rejected() {
    let options = CodecOptions {
        max_collection_length: 2,
        ..CodecOptions::default()
    };
    let err = deserialize::<Vec<u8>>(&hex!("01 03000000 01 02 03"), &options).unwrap_err();
    assert!(matches!(err, CodecError::LengthLimit { length: 3, max: 2, .. }), "{err}");
}

#[test]
fn string_over_the_limit_is_rejected() {
    let options = CodecOptions {
        max_string_length: 2,
        ..CodecOptions::default()
    };
    let err = deserialize::<String>(&hex!("01 03000000 61 62 63"), &options).unwrap_err();
    assert!(matches!(err, CodecError::LengthLimit { length: 3, max: 2, .. }), "{err}");
}

#[test]
fn writing_over_the_limit_is_rejected() {
    let options = CodecOptions {
        max_collection_length: 2,
        ..CodecOptions::default()
    };
    let err = serialize(&vec![1u8, 2, 3], &options).unwrap_err();
    assert!(matches!(err, CodecError::LengthLimit { length: 3, .. }), "{err}");
}

#[test]
fn deeply_nested_input_is_rejected() {
    // Each level is a non-null dynamic list of one dynamic element.
    let mut bytes = hex!("01 0200 22 26 01000000").repeat(5000);
    bytes.push(0);
    let err = deserialize::<Value>(&bytes, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::DepthLimit { max: 128 }), "{err}");
}

#[test]
fn deeply_nested_values_are_not_written() {
    let value = (0..200).fold(Value::Null, |inner, _| Value::List(vec![inner]));
    let err = serialize(&value, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::DepthLimit { max: 128 }), "{err}");
}

#[test]
fn depth_limit_counts_every_nested_value() {
    let options = CodecOptions {
        max_depth: 4,
        ..CodecOptions::default()
    };
    let fits = vec![vec![vec![7i32]]];
    let bytes = serialize(&fits, &options).unwrap();
    assert_eq!(deserialize::<Vec<Vec<Vec<i32>>>>(&bytes, &options).unwrap(), fits);

    let err = serialize(&vec![fits], &options).unwrap_err();
    assert!(matches!(err, CodecError::DepthLimit { max: 4 }), "{err}");
    let bytes = serialize(&vec![vec![vec![vec![7i32]]]], &CodecOptions::default()).unwrap();
    let err = deserialize::<Vec<Vec<Vec<Vec<i32>>>>>(&bytes, &options).unwrap_err();
    assert!(matches!(err, CodecError::DepthLimit { max: 4 }), "{err}");
}

#[test]
fn optional_dynamic_value_is_unsupported() {
    // `Some(Value::Null)` and `None` would share one encoding.
    let err = serialize(&Some(Value::Null), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedShape { .. }), "{err}");
    let err = deserialize::<Option<Value>>(&hex!("00"), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedShape { .. }), "{err}");
}

#[test]
fn negative_length_is_rejected() {
    let err = deserialize::<Vec<i32>>(&hex!("01 ffffffff"), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::NegativeLength { length: -1, .. }), "{err}");
}

#[test]
fn trailing_bytes_are_reported() {
    let err = deserialize::<i32>(&hex!("01000000 09"), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::TrailingBytes(1)), "{err}");
}

#[test]
fn short_input_reports_the_shortfall() {
    let err = deserialize::<i32>(&hex!("0100"), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedEof { needed: 2 }), "{err}");
}

#[test]
fn reader_input_is_consumed_exactly() {
    let options = CodecOptions::default();
    let mut input = Vec::new();
    input.extend_from_slice(&serialize(&"first".to_string(), &options).unwrap());
    input.extend_from_slice(&serialize(&42u16, &options).unwrap());
    let mut reader = input.as_slice();
    assert_eq!(
        deserialize_from_reader::<String, _>(&mut reader, &options).unwrap(),
        "first"
    );
    assert_eq!(reader, hex!("2a00"));
    assert_eq!(
        deserialize_from_reader::<u16, _>(&mut reader, &options).unwrap(),
        42
    );
    let err = deserialize_from_reader::<u16, _>(&mut reader, &options).unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedEof { .. }), "{err}");
}

#[test]
fn decoder_reads_consecutive_values() {
    let options = CodecOptions::default();
    let mut input = bytes::BytesMut::new();
    for n in [3u32, 1, 4] {
        input.extend_from_slice(&serialize(&n, &options).unwrap());
    }
    let mut decoder = Decoder::<u32>::new(&options).unwrap();
    let mut seen = Vec::new();
    while let Some(n) = decoder.decode_buf(&mut input).unwrap() {
        seen.push(n);
        if input.is_empty() {
            break;
        }
    }
    assert_eq!(seen, [3, 1, 4]);
}
