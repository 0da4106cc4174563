// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Type shapes: the keys converters are built and cached by.

use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use derive_more::Display;

use crate::decimal::Decimal;
use crate::value::{ObjectValue, Value};

/// Fixed-width leaf types.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "test"), derive(test_strategy::Arbitrary))]
pub enum CoreKind {
    #[display("bool")]
    Bool,
    #[display("i8")]
    I8,
    #[display("u8")]
    U8,
    #[display("i16")]
    I16,
    #[display("u16")]
    U16,
    #[display("i32")]
    I32,
    #[display("u32")]
    U32,
    #[display("i64")]
    I64,
    #[display("u64")]
    U64,
    #[display("f32")]
    F32,
    #[display("f64")]
    F64,
    #[display("decimal")]
    Decimal,
    #[display("char")]
    Char,
    #[display("datetime")]
    DateTime,
    #[display("datetimeoffset")]
    DateTimeOffset,
    #[display("date")]
    Date,
    #[display("time")]
    Time,
    #[display("timespan")]
    TimeSpan,
    #[display("guid")]
    Guid,
}

impl CoreKind {
    /// Bytes on the wire.
    pub const fn width(self) -> usize {
        match self {
            CoreKind::Bool | CoreKind::I8 | CoreKind::U8 => 1,
            CoreKind::I16 | CoreKind::U16 => 2,
            CoreKind::I32 | CoreKind::U32 | CoreKind::F32 | CoreKind::Char | CoreKind::Date => 4,
            CoreKind::I64 | CoreKind::U64 | CoreKind::F64 | CoreKind::Time => 8,
            CoreKind::DateTime | CoreKind::TimeSpan => 12,
            CoreKind::Decimal | CoreKind::DateTimeOffset | CoreKind::Guid => 16,
        }
    }

    pub fn default_value(self) -> Value {
        match self {
            CoreKind::Bool => Value::Bool(false),
            CoreKind::I8 => Value::I8(0),
            CoreKind::U8 => Value::U8(0),
            CoreKind::I16 => Value::I16(0),
            CoreKind::U16 => Value::U16(0),
            CoreKind::I32 => Value::I32(0),
            CoreKind::U32 => Value::U32(0),
            CoreKind::I64 => Value::I64(0),
            CoreKind::U64 => Value::U64(0),
            CoreKind::F32 => Value::F32(0.0),
            CoreKind::F64 => Value::F64(0.0),
            CoreKind::Decimal => Value::Decimal(Decimal::ZERO),
            CoreKind::Char => Value::Char('\0'),
            CoreKind::DateTime => Value::DateTime(Default::default()),
            CoreKind::DateTimeOffset => Value::DateTimeOffset(Default::default()),
            CoreKind::Date => Value::Date(Default::default()),
            CoreKind::Time => Value::Time(Default::default()),
            CoreKind::TimeSpan => Value::TimeSpan(chrono::TimeDelta::zero()),
            CoreKind::Guid => Value::Guid(uuid::Uuid::nil()),
        }
    }
}

/// A declared object type.
///
/// Fields are produced on demand so that a type can refer to itself
/// through a collection or an `Option`.
pub struct ObjectShape {
    pub name: &'static str,
    pub fields: fn() -> Vec<FieldShape>,
}

impl ObjectShape {
    pub fn fields(&self) -> Vec<FieldShape> {
        (self.fields)()
    }

    pub fn default_value(&self) -> ObjectValue {
        ObjectValue {
            type_name: self.name,
            fields: self
                .fields()
                .iter()
                .map(|field| field.shape.default_value())
                .collect(),
        }
    }
}

// Object types are identified by name on the wire, so they are here too.
impl PartialEq for ObjectShape {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ObjectShape {}

impl Hash for ObjectShape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for ObjectShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectShape").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    pub name: &'static str,
    /// Explicit wire position override.
    pub index: Option<u16>,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Core(CoreKind),
    String,
    /// Typed byte array, copied in bulk.
    Bytes,
    Nullable(Box<Shape>),
    Array(Box<Shape>),
    List(Box<Shape>),
    Set(Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Object(&'static ObjectShape),
    /// A value that carries its own type descriptor.
    Dynamic,
}

impl Shape {
    pub fn nullable(inner: Shape) -> Shape {
        Shape::Nullable(Box::new(inner))
    }

    pub fn array(element: Shape) -> Shape {
        Shape::Array(Box::new(element))
    }

    pub fn list(element: Shape) -> Shape {
        Shape::List(Box::new(element))
    }

    pub fn set(element: Shape) -> Shape {
        Shape::Set(Box::new(element))
    }

    pub fn map(key: Shape, value: Shape) -> Shape {
        Shape::Map(Box::new(key), Box::new(value))
    }

    /// Value given to declared fields that are absent from the input.
    pub fn default_value(&self) -> Value {
        match self {
            Shape::Core(kind) => kind.default_value(),
            Shape::String => Value::String(String::new()),
            Shape::Bytes => Value::Bytes(Bytes::new()),
            Shape::Nullable(_) | Shape::Dynamic => Value::Null,
            Shape::Array(_) => Value::Array(Vec::new()),
            Shape::List(_) => Value::List(Vec::new()),
            Shape::Set(_) => Value::Set(Vec::new()),
            Shape::Map(_, _) => Value::Map(Vec::new()),
            Shape::Object(object) => Value::Object(object.default_value()),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Core(kind) => fmt::Display::fmt(kind, f),
            Shape::String => f.write_str("string"),
            Shape::Bytes => f.write_str("bytes"),
            Shape::Nullable(inner) => write!(f, "Nullable<{inner}>"),
            Shape::Array(element) => write!(f, "Array<{element}>"),
            Shape::List(element) => write!(f, "List<{element}>"),
            Shape::Set(element) => write!(f, "Set<{element}>"),
            Shape::Map(key, value) => write!(f, "Map<{key}, {value}>"),
            Shape::Object(object) => f.write_str(object.name),
            Shape::Dynamic => f.write_str("dynamic"),
        }
    }
}

#[cfg(test)]
mod unittests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Shape::Core(CoreKind::I32), "i32")]
    #[case(Shape::nullable(Shape::Core(CoreKind::Guid)), "Nullable<guid>")]
    #[case(Shape::map(Shape::String, Shape::list(Shape::Bytes)), "Map<string, List<bytes>>")]
    fn display(#[case] shape: Shape, #[case] expected: &str) {
        assert_eq!(shape.to_string(), expected);
    }

    #[test]
    fn defaults_are_empty_not_null() {
        assert_eq!(Shape::String.default_value(), Value::String(String::new()));
        assert_eq!(
            Shape::list(Shape::String).default_value(),
            Value::List(Vec::new())
        );
        assert_eq!(
            Shape::nullable(Shape::String).default_value(),
            Value::Null
        );
    }
}
