// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Values whose shape is only known at run time:
//! `[marker][descriptor blob][value]`.

use crate::cursor::{ByteReader, ByteWriter};
use crate::descriptor;
use crate::error::{CodecError, Result};
use crate::factory::ConverterFactory;
use crate::shape::{CoreKind, Shape};
use crate::state::{Accessor, ReadState, WriteState};
use crate::value::Value;

pub(super) fn try_read(reader: &mut ByteReader<'_>, state: &mut ReadState) -> Result<Option<Value>> {
    let Some(is_null) = state.try_read_null_marker(reader)? else {
        return Ok(None);
    };
    if is_null {
        return Ok(Some(Value::Null));
    }
    let converter = match std::mem::take(&mut state.frame_mut().accessor) {
        Accessor::Resolved(converter, _) => converter,
        _ => {
            let blob = ready!(state, reader.try_read_blob());
            let factory = state.factory().clone();
            let shape = descriptor::decode(blob, &|name| factory.lookup_object(name))?;
            factory.get_transient(&shape)?
        }
    };
    let Some(value) = state.read_nested(reader, &converter, Some(false))? else {
        state.frame_mut().accessor = Accessor::Resolved(converter, false);
        return Ok(None);
    };
    Ok(Some(value))
}

pub(super) fn try_write(
    writer: &mut ByteWriter<'_>,
    state: &mut WriteState,
    value: &Value,
) -> Result<bool> {
    if !state.try_write_null_marker(writer, value.is_null())? {
        return Ok(false);
    }
    if value.is_null() {
        return Ok(true);
    }
    let resolved = match &state.frame().accessor {
        Accessor::Resolved(converter, _) => Some(converter.clone()),
        _ => None,
    };
    let converter = match resolved {
        Some(converter) => converter,
        None => {
            let factory = state.factory().clone();
            let shape = runtime_shape(&factory, value)?;
            ready!(state, writer.try_write_blob(&descriptor::encode(&shape)?));
            let converter = factory.get(&shape)?;
            state.frame_mut().accessor = Accessor::Resolved(converter.clone(), false);
            converter
        }
    };
    state.write_nested(writer, &converter, value, Some(false))
}

/// The shape a value is written with when nothing is declared about it.
/// Elements of collections are themselves written dynamically.
fn runtime_shape(factory: &ConverterFactory, value: &Value) -> Result<Shape> {
    let shape = match value {
        Value::Null => Shape::Dynamic,
        Value::Bool(_) => Shape::Core(CoreKind::Bool),
        Value::I8(_) => Shape::Core(CoreKind::I8),
        Value::U8(_) => Shape::Core(CoreKind::U8),
        Value::I16(_) => Shape::Core(CoreKind::I16),
        Value::U16(_) => Shape::Core(CoreKind::U16),
        Value::I32(_) => Shape::Core(CoreKind::I32),
        Value::U32(_) => Shape::Core(CoreKind::U32),
        Value::I64(_) => Shape::Core(CoreKind::I64),
        Value::U64(_) => Shape::Core(CoreKind::U64),
        Value::F32(_) => Shape::Core(CoreKind::F32),
        Value::F64(_) => Shape::Core(CoreKind::F64),
        Value::Decimal(_) => Shape::Core(CoreKind::Decimal),
        Value::Char(_) => Shape::Core(CoreKind::Char),
        Value::String(_) => Shape::String,
        Value::Bytes(_) => Shape::Bytes,
        Value::DateTime(_) => Shape::Core(CoreKind::DateTime),
        Value::DateTimeOffset(_) => Shape::Core(CoreKind::DateTimeOffset),
        Value::Date(_) => Shape::Core(CoreKind::Date),
        Value::Time(_) => Shape::Core(CoreKind::Time),
        Value::TimeSpan(_) => Shape::Core(CoreKind::TimeSpan),
        Value::Guid(_) => Shape::Core(CoreKind::Guid),
        Value::Array(_) => Shape::array(Shape::Dynamic),
        Value::List(_) => Shape::list(Shape::Dynamic),
        Value::Set(_) => Shape::set(Shape::Dynamic),
        Value::Map(_) => Shape::map(Shape::Dynamic, Shape::Dynamic),
        Value::Object(object) => Shape::Object(
            factory
                .lookup_object(object.type_name)
                .ok_or_else(|| CodecError::UnknownType(object.type_name.into()))?,
        ),
    };
    Ok(shape)
}
