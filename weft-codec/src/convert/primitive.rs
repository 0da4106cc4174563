// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Fixed-width leaf values. Each one is read and written as a single unit.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Timelike};
use uuid::Uuid;

use super::mismatch;
use crate::cursor::{ByteReader, ByteWriter};
use crate::decimal::Decimal;
use crate::error::{CodecError, Result};
use crate::shape::{CoreKind, Shape};
use crate::state::{ReadState, WriteState};
use crate::value::Value;

const NANOS_PER_SEC: u32 = 1_000_000_000;

pub(super) fn try_read(
    kind: CoreKind,
    reader: &mut ByteReader<'_>,
    state: &mut ReadState,
) -> Result<Option<Value>> {
    let raw = ready!(state, reader.try_read_exact(kind.width()));
    decode(kind, raw).map(Some)
}

pub(super) fn try_write(
    kind: CoreKind,
    writer: &mut ByteWriter<'_>,
    state: &mut WriteState,
    value: &Value,
) -> Result<bool> {
    let mut raw = [0u8; 16];
    encode(kind, value, &mut raw)?;
    ready!(state, writer.try_write_bytes(&raw[..kind.width()]));
    Ok(true)
}

fn le<const N: usize>(raw: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&raw[at..at + N]);
    out
}

fn put(raw: &mut [u8; 16], at: usize, bytes: &[u8]) {
    raw[at..at + bytes.len()].copy_from_slice(bytes);
}

fn decode(kind: CoreKind, raw: &[u8]) -> Result<Value> {
    let invalid = |reason: String| CodecError::invalid_value(Shape::Core(kind), reason);
    let value = match kind {
        CoreKind::Bool => match raw[0] {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            byte => return Err(invalid(format!("byte {byte:#04x}"))),
        },
        CoreKind::I8 => Value::I8(i8::from_le_bytes(le(raw, 0))),
        CoreKind::U8 => Value::U8(raw[0]),
        CoreKind::I16 => Value::I16(i16::from_le_bytes(le(raw, 0))),
        CoreKind::U16 => Value::U16(u16::from_le_bytes(le(raw, 0))),
        CoreKind::I32 => Value::I32(i32::from_le_bytes(le(raw, 0))),
        CoreKind::U32 => Value::U32(u32::from_le_bytes(le(raw, 0))),
        CoreKind::I64 => Value::I64(i64::from_le_bytes(le(raw, 0))),
        CoreKind::U64 => Value::U64(u64::from_le_bytes(le(raw, 0))),
        CoreKind::F32 => Value::F32(f32::from_le_bytes(le(raw, 0))),
        CoreKind::F64 => Value::F64(f64::from_le_bytes(le(raw, 0))),
        CoreKind::Decimal => {
            let parts = [0, 4, 8, 12].map(|at| u32::from_le_bytes(le(raw, at)));
            Value::Decimal(Decimal::from_raw(parts).map_err(|e| invalid(e.to_string()))?)
        }
        CoreKind::Char => {
            let code = u32::from_le_bytes(le(raw, 0));
            Value::Char(
                char::from_u32(code).ok_or_else(|| invalid(format!("code point {code:#x}")))?,
            )
        }
        CoreKind::DateTime => {
            let secs = i64::from_le_bytes(le(raw, 0));
            let nanos = u32::from_le_bytes(le(raw, 8));
            let utc = DateTime::from_timestamp(secs, nanos)
                .ok_or_else(|| invalid(format!("timestamp {secs}.{nanos:09}")))?;
            Value::DateTime(utc.naive_utc())
        }
        CoreKind::DateTimeOffset => {
            let secs = i64::from_le_bytes(le(raw, 0));
            let nanos = u32::from_le_bytes(le(raw, 8));
            let offset = i32::from_le_bytes(le(raw, 12));
            let offset = FixedOffset::east_opt(offset)
                .ok_or_else(|| invalid(format!("offset of {offset} seconds")))?;
            let utc = DateTime::from_timestamp(secs, nanos)
                .ok_or_else(|| invalid(format!("timestamp {secs}.{nanos:09}")))?;
            Value::DateTimeOffset(utc.with_timezone(&offset))
        }
        CoreKind::Date => {
            // Day zero is 0001-01-01, which chrono counts as day one.
            let days = i32::from_le_bytes(le(raw, 0));
            let date = days
                .checked_add(1)
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .ok_or_else(|| invalid(format!("day {days}")))?;
            Value::Date(date)
        }
        CoreKind::Time => {
            let secs = u32::from_le_bytes(le(raw, 0));
            let nanos = u32::from_le_bytes(le(raw, 4));
            let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .ok_or_else(|| invalid(format!("{secs}.{nanos:09}s after midnight")))?;
            Value::Time(time)
        }
        CoreKind::TimeSpan => {
            let secs = i64::from_le_bytes(le(raw, 0));
            let nanos = i32::from_le_bytes(le(raw, 8));
            Value::TimeSpan(
                time_span(secs, nanos)
                    .ok_or_else(|| invalid(format!("{secs}s and {nanos}ns")))?,
            )
        }
        CoreKind::Guid => Value::Guid(Uuid::from_bytes(le(raw, 0))),
    };
    Ok(value)
}

/// Whole seconds plus a same-signed sub-second remainder.
fn time_span(secs: i64, nanos: i32) -> Option<TimeDelta> {
    if nanos.unsigned_abs() >= NANOS_PER_SEC
        || (secs > 0 && nanos < 0)
        || (secs < 0 && nanos > 0)
    {
        return None;
    }
    TimeDelta::try_seconds(secs)?.checked_add(&TimeDelta::nanoseconds(nanos.into()))
}

fn encode(kind: CoreKind, value: &Value, raw: &mut [u8; 16]) -> Result<()> {
    match (kind, value) {
        (CoreKind::Bool, Value::Bool(v)) => raw[0] = u8::from(*v),
        (CoreKind::I8, Value::I8(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::U8, Value::U8(v)) => raw[0] = *v,
        (CoreKind::I16, Value::I16(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::U16, Value::U16(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::I32, Value::I32(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::U32, Value::U32(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::I64, Value::I64(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::U64, Value::U64(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::F32, Value::F32(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::F64, Value::F64(v)) => put(raw, 0, &v.to_le_bytes()),
        (CoreKind::Decimal, Value::Decimal(v)) => {
            for (i, part) in v.to_raw().iter().enumerate() {
                put(raw, i * 4, &part.to_le_bytes());
            }
        }
        (CoreKind::Char, Value::Char(v)) => put(raw, 0, &u32::from(*v).to_le_bytes()),
        (CoreKind::DateTime, Value::DateTime(v)) => {
            let utc = v.and_utc();
            put(raw, 0, &utc.timestamp().to_le_bytes());
            put(raw, 8, &utc.timestamp_subsec_nanos().to_le_bytes());
        }
        (CoreKind::DateTimeOffset, Value::DateTimeOffset(v)) => {
            put(raw, 0, &v.timestamp().to_le_bytes());
            put(raw, 8, &v.timestamp_subsec_nanos().to_le_bytes());
            put(raw, 12, &v.offset().local_minus_utc().to_le_bytes());
        }
        (CoreKind::Date, Value::Date(v)) => put(raw, 0, &(v.num_days_from_ce() - 1).to_le_bytes()),
        (CoreKind::Time, Value::Time(v)) => {
            put(raw, 0, &v.num_seconds_from_midnight().to_le_bytes());
            put(raw, 4, &v.nanosecond().to_le_bytes());
        }
        (CoreKind::TimeSpan, Value::TimeSpan(v)) => {
            put(raw, 0, &v.num_seconds().to_le_bytes());
            put(raw, 8, &v.subsec_nanos().to_le_bytes());
        }
        (CoreKind::Guid, Value::Guid(v)) => put(raw, 0, v.as_bytes()),
        (_, other) => return Err(mismatch(Shape::Core(kind), other)),
    }
    Ok(())
}
