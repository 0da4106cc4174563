// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Proptest strategies for shapes and the values that fit them.

use ::proptest::collection::vec;
use ::proptest::prelude::*;
use ::proptest::sample::Index;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use uuid::Uuid;

use crate::decimal::{Decimal, MAX_SCALE};
use crate::shape::{CoreKind, Shape};
use crate::value::{ObjectValue, Value};

/// 0001-01-01T00:00:00Z and 9999-12-31T23:59:59Z.
const MIN_SECS: i64 = -62_135_596_800;
const MAX_SECS: i64 = 253_402_300_799;

impl Arbitrary for Decimal {
    type Parameters = ();
    type Strategy = BoxedStrategy<Decimal>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (-(1i128 << 96) + 1..(1i128 << 96), 0..=MAX_SCALE)
            .prop_filter_map("in range", |(mantissa, scale)| {
                Decimal::new(mantissa, scale).ok()
            })
            .boxed()
    }
}

fn arb_timestamp() -> impl Strategy<Value = DateTime<chrono::Utc>> {
    (MIN_SECS..=MAX_SECS, 0..1_000_000_000u32)
        .prop_filter_map("valid timestamp", |(secs, nanos)| {
            DateTime::from_timestamp(secs, nanos)
        })
}

/// Values of one fixed-width kind. Floats are finite so that values compare
/// equal after a round trip.
pub fn arb_core_value(kind: CoreKind) -> BoxedStrategy<Value> {
    match kind {
        CoreKind::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        CoreKind::I8 => any::<i8>().prop_map(Value::I8).boxed(),
        CoreKind::U8 => any::<u8>().prop_map(Value::U8).boxed(),
        CoreKind::I16 => any::<i16>().prop_map(Value::I16).boxed(),
        CoreKind::U16 => any::<u16>().prop_map(Value::U16).boxed(),
        CoreKind::I32 => any::<i32>().prop_map(Value::I32).boxed(),
        CoreKind::U32 => any::<u32>().prop_map(Value::U32).boxed(),
        CoreKind::I64 => any::<i64>().prop_map(Value::I64).boxed(),
        CoreKind::U64 => any::<u64>().prop_map(Value::U64).boxed(),
        CoreKind::F32 => (-1e30f32..1e30).prop_map(Value::F32).boxed(),
        CoreKind::F64 => (-1e300f64..1e300).prop_map(Value::F64).boxed(),
        CoreKind::Decimal => any::<Decimal>().prop_map(Value::Decimal).boxed(),
        CoreKind::Char => any::<char>().prop_map(Value::Char).boxed(),
        CoreKind::DateTime => arb_timestamp()
            .prop_map(|t| Value::DateTime(t.naive_utc()))
            .boxed(),
        CoreKind::DateTimeOffset => (arb_timestamp(), -86_399..86_400i32)
            .prop_filter_map("valid offset", |(t, offset)| {
                FixedOffset::east_opt(offset).map(|o| Value::DateTimeOffset(t.with_timezone(&o)))
            })
            .boxed(),
        CoreKind::Date => (0..3_652_059i32)
            .prop_filter_map("valid date", |days| {
                NaiveDate::from_num_days_from_ce_opt(days + 1).map(Value::Date)
            })
            .boxed(),
        CoreKind::Time => (0..86_400u32, 0..1_000_000_000u32)
            .prop_filter_map("valid time", |(secs, nanos)| {
                NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).map(Value::Time)
            })
            .boxed(),
        CoreKind::TimeSpan => (-(1i64 << 40)..(1i64 << 40))
            .prop_map(|nanos| Value::TimeSpan(TimeDelta::nanoseconds(nanos)))
            .boxed(),
        CoreKind::Guid => any::<[u8; 16]>()
            .prop_map(|bytes| Value::Guid(Uuid::from_bytes(bytes)))
            .boxed(),
    }
}

/// Shapes without object types, nested at most `depth` levels.
pub fn arb_shape(depth: u32) -> BoxedStrategy<Shape> {
    let leaf = prop_oneof![
        4 => any::<CoreKind>().prop_map(Shape::Core),
        1 => Just(Shape::String),
        1 => Just(Shape::Bytes),
        1 => Just(Shape::Dynamic),
    ];
    leaf.prop_recursive(depth, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|shape| match shape {
                Shape::Nullable(_) | Shape::Dynamic => shape,
                shape => Shape::nullable(shape),
            }),
            inner.clone().prop_map(Shape::array),
            inner.clone().prop_map(Shape::list),
            inner.clone().prop_map(Shape::set),
            (inner.clone(), inner).prop_map(|(k, v)| Shape::map(k, v)),
        ]
    })
    .boxed()
}

/// Values of `shape`. Collections hold at most `size` elements and stop
/// growing once `depth` runs out, which bounds recursive object types.
pub fn arb_value(shape: &Shape, depth: u32, size: usize) -> BoxedStrategy<Value> {
    let len = if depth == 0 { 0..1 } else { 0..size + 1 };
    let next = depth.saturating_sub(1);
    match shape {
        Shape::Core(kind) => arb_core_value(*kind),
        Shape::String => ".{0,24}".prop_map(Value::String).boxed(),
        Shape::Bytes => vec(any::<u8>(), 0..64)
            .prop_map(|b| Value::Bytes(Bytes::from(b)))
            .boxed(),
        Shape::Nullable(_) | Shape::Dynamic if depth == 0 => Just(Value::Null).boxed(),
        Shape::Nullable(inner) => prop_oneof![
            1 => Just(Value::Null),
            3 => arb_value(inner, next, size),
        ]
        .boxed(),
        Shape::Array(element) => vec(arb_value(element, next, size), len)
            .prop_map(Value::Array)
            .boxed(),
        Shape::List(element) => vec(arb_value(element, next, size), len)
            .prop_map(Value::List)
            .boxed(),
        Shape::Set(element) => vec(arb_value(element, next, size), len)
            .prop_map(Value::Set)
            .boxed(),
        Shape::Map(key, value) => vec(
            (arb_value(key, next, size), arb_value(value, next, size)),
            len,
        )
        .prop_map(Value::Map)
        .boxed(),
        Shape::Object(object) => {
            let type_name = object.name;
            let fields: Vec<_> = object
                .fields()
                .iter()
                .map(|field| arb_value(&field.shape, next, size))
                .collect();
            fields
                .prop_map(move |fields| Value::Object(ObjectValue { type_name, fields }))
                .boxed()
        }
        Shape::Dynamic => arb_shape(1)
            .prop_flat_map(move |shape| {
                prop_oneof![1 => Just(Value::Null), 4 => arb_value(&shape, next, size)]
            })
            .boxed(),
    }
}

/// A shape together with a value that fits it.
pub fn arb_shaped_value() -> impl Strategy<Value = (Shape, Value)> {
    arb_shape(3).prop_flat_map(|shape| {
        let value = arb_value(&shape, 4, 4);
        (Just(shape), value)
    })
}

/// Picks for splitting a buffer into pieces; see [`cut_points`].
pub fn arb_cuts() -> impl Strategy<Value = Vec<Index>> {
    vec(any::<Index>(), 0..8)
}

/// Sorted interior offsets of a `len` byte buffer chosen by `picks`.
pub fn cut_points(len: usize, picks: &[Index]) -> Vec<usize> {
    let mut cuts: Vec<_> = picks
        .iter()
        .map(|pick| pick.index(len.max(1)))
        .filter(|&cut| cut > 0 && cut < len)
        .collect();
    cuts.sort_unstable();
    cuts.dedup();
    cuts
}
