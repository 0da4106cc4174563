// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Reading data written by a different revision of the same object type.

use std::sync::Arc;

use bytes::BytesMut;

use weft_codec::{
    CodecError, CodecOptions, ConverterFactory, Decoded, Decoder, Encoder, WireType, wire_object,
};

mod before {
    use weft_codec::wire_object;

    #[derive(Debug, PartialEq)]
    pub struct Record {
        pub id: i32,
        pub note: String,
        pub tags: Vec<String>,
    }

    wire_object!(Record {
        id: i32,
        note: String,
        tags: Vec<String>,
    });
}

mod after {
    use weft_codec::wire_object;

    #[derive(Debug, PartialEq)]
    pub struct Record {
        pub note: String,
        pub id: i64,
        pub archived: bool,
    }

    wire_object!(Record {
        note: String,
        id: i64,
        archived: bool,
    });
}

fn write<T: WireType>(value: &T, options: CodecOptions) -> Vec<u8> {
    let factory = Arc::new(ConverterFactory::new(options));
    Encoder::with_factory(value, factory)
        .unwrap()
        .finish()
        .unwrap()
        .to_vec()
}

fn read<T: WireType>(bytes: &[u8], options: CodecOptions) -> weft_codec::Result<T> {
    let factory = Arc::new(ConverterFactory::new(options));
    let mut decoder = Decoder::<T>::with_factory(factory)?;
    match decoder.decode(bytes)? {
        Decoded::Complete { value, consumed } => {
            assert_eq!(consumed, bytes.len());
            Ok(value)
        }
        Decoded::Incomplete { needed, .. } => Err(CodecError::UnexpectedEof { needed }),
    }
}

fn original() -> before::Record {
    before::Record {
        id: 12,
        note: "kept".into(),
        tags: vec!["x".into(), "yz".into()],
    }
}

#[test_log::test]
fn mismatched_and_unknown_fields_are_drained() {
    let options = CodecOptions::default()
        .with_property_names()
        .with_property_types();
    let bytes = write(&original(), options);
    let record: after::Record = read(&bytes, options).unwrap();
    assert_eq!(
        record,
        after::Record {
            note: "kept".into(),
            // Written as i32, expected as i64: skipped and defaulted.
            id: 0,
            archived: false,
        }
    );
}

#[test_log::test]
fn missing_fields_take_defaults() {
    let options = CodecOptions::default()
        .with_property_names()
        .with_property_types();
    let bytes = write(
        &after::Record {
            note: "n".into(),
            id: 9,
            archived: true,
        },
        options,
    );
    let record: before::Record = read(&bytes, options).unwrap();
    assert_eq!(
        record,
        before::Record {
            id: 0,
            note: "n".into(),
            tags: Vec::new(),
        }
    );
}

#[test]
fn unknown_field_without_type_info_fails() {
    #[derive(Debug)]
    struct Record {
        #[allow(dead_code)]
        note: String,
    }
    wire_object!(Record { note: String });

    let options = CodecOptions::default().with_property_names();
    let bytes = write(&original(), options);
    let err = read::<Record>(&bytes, options).unwrap_err();
    assert!(
        matches!(err, CodecError::UnknownField { object: "Record", ref field } if field == "id"),
        "{err}"
    );
}

#[test]
fn positional_reads_match_by_position() {
    #[derive(Debug, PartialEq)]
    struct Pair {
        first: u8,
        second: u8,
    }
    wire_object!(Pair { first: u8, second: u8 });

    #[derive(Debug, PartialEq)]
    struct Widened {
        first: u8,
        second: u8,
        third: u8,
    }
    wire_object!(Widened {
        first: u8,
        second: u8,
        third: u8,
    });

    let options = CodecOptions::default();
    let bytes = write(&Pair { first: 1, second: 2 }, options);
    assert_eq!(
        read::<Widened>(&bytes, options).unwrap(),
        Widened {
            first: 1,
            second: 2,
            third: 0
        }
    );
    let bytes = write(
        &Widened {
            first: 1,
            second: 2,
            third: 3,
        },
        options,
    );
    let err = read::<Pair>(&bytes, options).unwrap_err();
    assert!(matches!(err, CodecError::UnknownField { .. }), "{err}");
}

#[test]
fn drained_fields_survive_chunked_input() {
    let options = CodecOptions::default()
        .with_property_names()
        .with_property_types();
    let bytes = write(&original(), options);
    let factory = Arc::new(ConverterFactory::new(options));
    let mut decoder = Decoder::<after::Record>::with_factory(factory).unwrap();
    let mut pending = BytesMut::new();
    let mut decoded = None;
    for byte in &bytes {
        assert!(decoded.is_none(), "value completed early");
        pending.extend_from_slice(std::slice::from_ref(byte));
        decoded = decoder.decode_buf(&mut pending).unwrap();
    }
    assert!(pending.is_empty());
    assert_eq!(
        decoded,
        Some(after::Record {
            note: "kept".into(),
            id: 0,
            archived: false,
        })
    );
}
