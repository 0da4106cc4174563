// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use super::Converter;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::Result;
use crate::shape::Shape;
use crate::state::{ReadState, WriteState};
use crate::value::Value;

/// `Option<T>`: a null marker, then the inner value when present.
///
/// The inner converter runs in the same frame, so an inner reference type
/// sees the marker this converter already consumed and does not read a
/// second one.
#[derive(Debug)]
pub struct NullableConverter {
    inner: Converter,
    shape: Shape,
}

impl NullableConverter {
    pub(crate) fn new(inner: Converter) -> Self {
        let shape = Shape::nullable(inner.shape());
        NullableConverter { inner, shape }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn inner(&self) -> &Converter {
        &self.inner
    }

    pub(super) fn try_read(
        &self,
        reader: &mut ByteReader<'_>,
        state: &mut ReadState,
    ) -> Result<Option<Value>> {
        let Some(is_null) = state.try_read_null_marker(reader)? else {
            return Ok(None);
        };
        if is_null {
            return Ok(Some(Value::Null));
        }
        self.inner.try_read(reader, state)
    }

    pub(super) fn try_write(
        &self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        let is_null = value.is_null();
        if !state.try_write_null_marker(writer, is_null)? {
            return Ok(false);
        }
        if is_null {
            return Ok(true);
        }
        self.inner.try_write(writer, state, value)
    }
}
