// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Run-time type descriptors.
//!
//! A descriptor is the pre-order encoding of a [`Shape`]: one tag byte per
//! node, children following their parent, object nodes followed by their
//! type name as `[u16 length][UTF-8]`. On the wire it travels as a blob so
//! it is read and written as a single unit.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::cursor::ByteReader;
use crate::error::{CodecError, Result};
use crate::shape::{CoreKind, ObjectShape, Shape};

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
enum TypeTag {
    Bool = 0x01,
    I8 = 0x02,
    U8 = 0x03,
    I16 = 0x04,
    U16 = 0x05,
    I32 = 0x06,
    U32 = 0x07,
    I64 = 0x08,
    U64 = 0x09,
    F32 = 0x0A,
    F64 = 0x0B,
    Decimal = 0x0C,
    Char = 0x0D,
    String = 0x0E,
    Bytes = 0x0F,
    DateTime = 0x10,
    DateTimeOffset = 0x11,
    Date = 0x12,
    Time = 0x13,
    TimeSpan = 0x14,
    Guid = 0x15,
    Nullable = 0x20,
    Array = 0x21,
    List = 0x22,
    Set = 0x23,
    Map = 0x24,
    Object = 0x25,
    Dynamic = 0x26,
}

impl From<CoreKind> for TypeTag {
    fn from(kind: CoreKind) -> Self {
        match kind {
            CoreKind::Bool => TypeTag::Bool,
            CoreKind::I8 => TypeTag::I8,
            CoreKind::U8 => TypeTag::U8,
            CoreKind::I16 => TypeTag::I16,
            CoreKind::U16 => TypeTag::U16,
            CoreKind::I32 => TypeTag::I32,
            CoreKind::U32 => TypeTag::U32,
            CoreKind::I64 => TypeTag::I64,
            CoreKind::U64 => TypeTag::U64,
            CoreKind::F32 => TypeTag::F32,
            CoreKind::F64 => TypeTag::F64,
            CoreKind::Decimal => TypeTag::Decimal,
            CoreKind::Char => TypeTag::Char,
            CoreKind::DateTime => TypeTag::DateTime,
            CoreKind::DateTimeOffset => TypeTag::DateTimeOffset,
            CoreKind::Date => TypeTag::Date,
            CoreKind::Time => TypeTag::Time,
            CoreKind::TimeSpan => TypeTag::TimeSpan,
            CoreKind::Guid => TypeTag::Guid,
        }
    }
}

/// Encodes `shape`. Fails when the result would not fit a blob.
pub fn encode(shape: &Shape) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(shape, &mut out)?;
    if out.len() > u16::MAX as usize {
        return Err(CodecError::InvalidDescriptor(format!(
            "descriptor of {shape} is {} bytes long",
            out.len()
        )));
    }
    Ok(out)
}

fn encode_into(shape: &Shape, out: &mut Vec<u8>) -> Result<()> {
    let tag = match shape {
        Shape::Core(kind) => TypeTag::from(*kind),
        Shape::String => TypeTag::String,
        Shape::Bytes => TypeTag::Bytes,
        Shape::Nullable(_) => TypeTag::Nullable,
        Shape::Array(_) => TypeTag::Array,
        Shape::List(_) => TypeTag::List,
        Shape::Set(_) => TypeTag::Set,
        Shape::Map(_, _) => TypeTag::Map,
        Shape::Object(_) => TypeTag::Object,
        Shape::Dynamic => TypeTag::Dynamic,
    };
    out.push(tag.into());
    match shape {
        Shape::Nullable(inner)
        | Shape::Array(inner)
        | Shape::List(inner)
        | Shape::Set(inner) => encode_into(inner, out),
        Shape::Map(key, value) => {
            encode_into(key, out)?;
            encode_into(value, out)
        }
        Shape::Object(object) => {
            let name = object.name.as_bytes();
            let len = u16::try_from(name.len()).map_err(|_| {
                CodecError::InvalidDescriptor(format!("type name {} is too long", object.name))
            })?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(name);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Decodes a descriptor, resolving object names with `resolve`.
pub fn decode(
    bytes: &[u8],
    resolve: &dyn Fn(&str) -> Option<&'static ObjectShape>,
) -> Result<Shape> {
    let mut reader = ByteReader::new(bytes);
    let shape = decode_node(&mut reader, resolve, 0)?;
    if reader.remaining() != 0 {
        return Err(CodecError::InvalidDescriptor(format!(
            "{} trailing bytes after {shape}",
            reader.remaining()
        )));
    }
    Ok(shape)
}

fn truncated<T>(_: T) -> CodecError {
    CodecError::InvalidDescriptor("truncated descriptor".into())
}

fn decode_node(
    reader: &mut ByteReader<'_>,
    resolve: &dyn Fn(&str) -> Option<&'static ObjectShape>,
    depth: usize,
) -> Result<Shape> {
    if depth > MAX_DEPTH {
        return Err(CodecError::InvalidDescriptor(format!(
            "nesting deeper than {MAX_DEPTH}"
        )));
    }
    let raw = reader.try_read_u8().map_err(truncated)?;
    let tag = TypeTag::try_from(raw)
        .map_err(|_| CodecError::InvalidDescriptor(format!("unknown type tag {raw:#04x}")))?;
    let shape = match tag {
        TypeTag::Bool => Shape::Core(CoreKind::Bool),
        TypeTag::I8 => Shape::Core(CoreKind::I8),
        TypeTag::U8 => Shape::Core(CoreKind::U8),
        TypeTag::I16 => Shape::Core(CoreKind::I16),
        TypeTag::U16 => Shape::Core(CoreKind::U16),
        TypeTag::I32 => Shape::Core(CoreKind::I32),
        TypeTag::U32 => Shape::Core(CoreKind::U32),
        TypeTag::I64 => Shape::Core(CoreKind::I64),
        TypeTag::U64 => Shape::Core(CoreKind::U64),
        TypeTag::F32 => Shape::Core(CoreKind::F32),
        TypeTag::F64 => Shape::Core(CoreKind::F64),
        TypeTag::Decimal => Shape::Core(CoreKind::Decimal),
        TypeTag::Char => Shape::Core(CoreKind::Char),
        TypeTag::DateTime => Shape::Core(CoreKind::DateTime),
        TypeTag::DateTimeOffset => Shape::Core(CoreKind::DateTimeOffset),
        TypeTag::Date => Shape::Core(CoreKind::Date),
        TypeTag::Time => Shape::Core(CoreKind::Time),
        TypeTag::TimeSpan => Shape::Core(CoreKind::TimeSpan),
        TypeTag::Guid => Shape::Core(CoreKind::Guid),
        TypeTag::String => Shape::String,
        TypeTag::Bytes => Shape::Bytes,
        TypeTag::Dynamic => Shape::Dynamic,
        TypeTag::Nullable => Shape::Nullable(decode_child(reader, resolve, depth)?),
        TypeTag::Array => Shape::Array(decode_child(reader, resolve, depth)?),
        TypeTag::List => Shape::List(decode_child(reader, resolve, depth)?),
        TypeTag::Set => Shape::Set(decode_child(reader, resolve, depth)?),
        TypeTag::Map => {
            let key = decode_child(reader, resolve, depth)?;
            Shape::Map(key, decode_child(reader, resolve, depth)?)
        }
        TypeTag::Object => {
            let len = reader.try_read_u16().map_err(truncated)?;
            let name = reader.try_read_exact(len as usize).map_err(truncated)?;
            let name = std::str::from_utf8(name)
                .map_err(|e| CodecError::InvalidDescriptor(format!("type name: {e}")))?;
            let object = resolve(name).ok_or_else(|| CodecError::UnknownType(name.into()))?;
            Shape::Object(object)
        }
    };
    Ok(shape)
}

fn decode_child(
    reader: &mut ByteReader<'_>,
    resolve: &dyn Fn(&str) -> Option<&'static ObjectShape>,
    depth: usize,
) -> Result<Box<Shape>> {
    decode_node(reader, resolve, depth + 1).map(Box::new)
}

#[cfg(test)]
mod unittests {
    use hex_literal::hex;
    use rstest::rstest;

    use super::*;

    static POINT: ObjectShape = ObjectShape {
        name: "Point",
        fields: Vec::new,
    };

    fn resolve(name: &str) -> Option<&'static ObjectShape> {
        (name == "Point").then_some(&POINT)
    }

    #[rstest]
    #[case(Shape::Core(CoreKind::I32), &hex!("06"))]
    #[case(Shape::nullable(Shape::Core(CoreKind::Guid)), &hex!("20 15"))]
    #[case(Shape::map(Shape::String, Shape::list(Shape::Dynamic)), &hex!("24 0e 22 26"))]
    #[case(Shape::set(Shape::Object(&POINT)), &hex!("23 25 05 00 50 6f 69 6e 74"))]
    fn layout(#[case] shape: Shape, #[case] expected: &[u8]) {
        let encoded = encode(&shape).unwrap();
        assert_eq!(encoded, expected);
        assert_eq!(decode(&encoded, &resolve).unwrap(), shape);
    }

    #[rstest]
    #[case::unknown_tag(&hex!("7f"))]
    #[case::truncated_map(&hex!("24 0e"))]
    #[case::trailing(&hex!("06 06"))]
    #[case::truncated_name(&hex!("25 05 00 50"))]
    fn malformed(#[case] bytes: &[u8]) {
        assert!(matches!(
            decode(bytes, &resolve),
            Err(CodecError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn unknown_object_name() {
        let bytes = hex!("25 03 00 46 6f 6f");
        assert!(matches!(
            decode(&bytes, &resolve),
            Err(CodecError::UnknownType(name)) if name == "Foo"
        ));
    }

    #[test]
    fn depth_is_bounded() {
        let bytes = vec![0x22; MAX_DEPTH + 2];
        assert!(matches!(
            decode(&bytes, &resolve),
            Err(CodecError::InvalidDescriptor(_))
        ));
    }
}
