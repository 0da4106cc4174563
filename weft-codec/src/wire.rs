// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Mapping between Rust types and the dynamic [`Value`] model.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::decimal::Decimal;
use crate::error::{CodecError, Result};
use crate::shape::{CoreKind, Shape};
use crate::value::{ObjectValue, Value};

/// A type the codec can read and write.
///
/// Object types implement this through [`wire_object!`](crate::wire_object).
pub trait WireType: Sized {
    fn shape() -> Shape;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T: WireType>(found: &Value) -> CodecError {
    CodecError::type_mismatch(T::shape(), found.kind_name())
}

macro_rules! core_wire_type {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl WireType for $ty {
                fn shape() -> Shape {
                    Shape::Core(CoreKind::$kind)
                }

                fn to_value(&self) -> Value {
                    Value::$kind(*self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$kind(v) => Ok(v),
                        other => Err(mismatch::<Self>(&other)),
                    }
                }
            }
        )*
    };
}

core_wire_type! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    char => Char,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    NaiveDate => Date,
    NaiveTime => Time,
    TimeDelta => TimeSpan,
    Uuid => Guid,
}

impl WireType for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::Core(CoreKind::DateTimeOffset)
    }

    fn to_value(&self) -> Value {
        Value::DateTimeOffset(self.fixed_offset())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTimeOffset(v) => Ok(v.with_timezone(&Utc)),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl WireType for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl WireType for Bytes {
    fn shape() -> Shape {
        Shape::Bytes
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

/// Values of any shape, each carrying its own descriptor.
impl WireType for Value {
    fn shape() -> Shape {
        Shape::Dynamic
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: WireType> WireType for Option<T> {
    fn shape() -> Shape {
        Shape::nullable(T::shape())
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: WireType> WireType for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value {
        T::to_value(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

fn elements<T: WireType>(items: Vec<Value>) -> Result<Vec<T>> {
    items.into_iter().map(T::from_value).collect()
}

impl<T: WireType> WireType for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => elements(items),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: WireType> WireType for VecDeque<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => elements(items).map(VecDeque::from),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: WireType, const N: usize> WireType for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => elements::<T>(items)?,
            other => return Err(mismatch::<Self>(&other)),
        };
        items.try_into().map_err(|items: Vec<T>| {
            CodecError::invalid_value(
                Self::shape(),
                format!("expected {N} elements, got {}", items.len()),
            )
        })
    }
}

impl<T: WireType + Eq + Hash, S: BuildHasher + Default> WireType for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::set(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: WireType + Ord> WireType for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::set(T::shape())
    }

    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Set(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

fn entries<K: WireType, V: WireType, C: FromIterator<(K, V)>>(
    pairs: Vec<(Value, Value)>,
) -> Result<C> {
    pairs
        .into_iter()
        .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
        .collect()
}

impl<K, V, S> WireType for HashMap<K, V, S>
where
    K: WireType + Eq + Hash,
    V: WireType,
    S: BuildHasher + Default,
{
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(pairs) => entries(pairs),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<K: WireType + Ord, V: WireType> WireType for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Map(pairs) => entries(pairs),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

#[doc(hidden)]
pub fn expect_object(value: Value, name: &'static str) -> Result<ObjectValue> {
    match value {
        Value::Object(object) if object.type_name == name => Ok(object),
        Value::Object(object) => Err(CodecError::type_mismatch(name, object.type_name)),
        other => Err(CodecError::type_mismatch(name, other.kind_name())),
    }
}

#[doc(hidden)]
pub fn next_field<T: WireType>(
    fields: &mut impl Iterator<Item = Value>,
    object: &'static str,
    field: &'static str,
) -> Result<T> {
    let value = fields.next().ok_or_else(|| {
        CodecError::invalid_value(
            T::shape(),
            format!("{object}.{field} is missing from the object value"),
        )
    })?;
    T::from_value(value)
}

/// Implements [`WireType`] for a struct with named fields.
///
/// Fields are listed with their types, in declaration order. A field may
/// carry `#[index = N]` to override its position on the wire; fields
/// without one follow all indexed fields, in declaration order.
///
/// ```
/// use weft_codec::wire_object;
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
///     label: Option<String>,
/// }
///
/// wire_object!(Point {
///     #[index = 1] x: i32,
///     #[index = 0] y: i32,
///     label: Option<String>,
/// });
/// ```
#[macro_export]
macro_rules! wire_object {
    (@index) => {
        ::std::option::Option::None
    };
    (@index $index:literal) => {
        ::std::option::Option::Some($index)
    };
    ($ty:ident { $( $(#[index = $index:literal])? $field:ident : $field_ty:ty ),* $(,)? }) => {
        impl $crate::WireType for $ty {
            fn shape() -> $crate::Shape {
                fn fields() -> ::std::vec::Vec<$crate::FieldShape> {
                    ::std::vec![$(
                        $crate::FieldShape {
                            name: ::std::stringify!($field),
                            index: $crate::wire_object!(@index $($index)?),
                            shape: <$field_ty as $crate::WireType>::shape(),
                        }
                    ),*]
                }
                static SHAPE: $crate::ObjectShape = $crate::ObjectShape {
                    name: ::std::stringify!($ty),
                    fields,
                };
                $crate::Shape::Object(&SHAPE)
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Object($crate::ObjectValue {
                    type_name: ::std::stringify!($ty),
                    fields: ::std::vec![$(
                        <$field_ty as $crate::WireType>::to_value(&self.$field)
                    ),*],
                })
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let object = $crate::wire::expect_object(value, ::std::stringify!($ty))?;
                #[allow(unused_mut, unused_variables)]
                let mut fields = object.fields.into_iter();
                ::std::result::Result::Ok($ty {
                    $(
                        $field: $crate::wire::next_field::<$field_ty>(
                            &mut fields,
                            ::std::stringify!($ty),
                            ::std::stringify!($field),
                        )?,
                    )*
                })
            }
        }
    };
}
