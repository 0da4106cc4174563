// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Converters: immutable, shareable per-shape read/write logic.
//!
//! A converter never stores progress. Everything it has to remember across
//! suspension lives in the [`Frame`](crate::state::Frame) the state keeps
//! for it, which is why one converter can serve any number of concurrent
//! reads and writes.

mod collection;
mod dynamic;
mod nullable;
mod object;
mod payload;
mod primitive;
mod typed;

use std::fmt;
use std::sync::Arc;

pub use collection::{MapConverter, SequenceConverter, SequenceKind};
pub use nullable::NullableConverter;
pub use object::ObjectConverter;
pub(crate) use object::{FieldConverter, ObjectLayout};
pub use payload::PayloadKind;
pub use typed::TypeInfoConverter;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{CodecError, Result};
use crate::shape::{CoreKind, Shape};
use crate::state::{ReadState, WriteState};
use crate::value::Value;

#[derive(Clone)]
pub enum Converter {
    Core(CoreKind),
    Payload(PayloadKind),
    Nullable(Arc<NullableConverter>),
    Sequence(Arc<SequenceConverter>),
    Map(Arc<MapConverter>),
    Object(Arc<ObjectConverter>),
    TypeInfo(Arc<TypeInfoConverter>),
    Dynamic,
}

impl Converter {
    /// The shape this converter was built for. Type-info wrappers report the
    /// shape they expect; the skip converter reports [`Shape::Dynamic`].
    pub fn shape(&self) -> Shape {
        match self {
            Converter::Core(kind) => Shape::Core(*kind),
            Converter::Payload(kind) => kind.shape(),
            Converter::Nullable(c) => c.shape().clone(),
            Converter::Sequence(c) => c.shape().clone(),
            Converter::Map(c) => c.shape().clone(),
            Converter::Object(c) => Shape::Object(c.object()),
            Converter::TypeInfo(c) => c.expected_shape().cloned().unwrap_or(Shape::Dynamic),
            Converter::Dynamic => Shape::Dynamic,
        }
    }

    /// Identity, not structural equality.
    pub fn ptr_eq(&self, other: &Converter) -> bool {
        match (self, other) {
            (Converter::Core(a), Converter::Core(b)) => a == b,
            (Converter::Payload(a), Converter::Payload(b)) => a == b,
            (Converter::Nullable(a), Converter::Nullable(b)) => Arc::ptr_eq(a, b),
            (Converter::Sequence(a), Converter::Sequence(b)) => Arc::ptr_eq(a, b),
            (Converter::Map(a), Converter::Map(b)) => Arc::ptr_eq(a, b),
            (Converter::Object(a), Converter::Object(b)) => Arc::ptr_eq(a, b),
            (Converter::TypeInfo(a), Converter::TypeInfo(b)) => Arc::ptr_eq(a, b),
            (Converter::Dynamic, Converter::Dynamic) => true,
            _ => false,
        }
    }

    /// Reads one value, or returns `None` after recording on `state` how
    /// many more bytes the input must provide.
    ///
    /// Called through [`ReadState::read_nested`], which owns the frame
    /// bookkeeping.
    pub(crate) fn try_read(
        &self,
        reader: &mut ByteReader<'_>,
        state: &mut ReadState,
    ) -> Result<Option<Value>> {
        match self {
            Converter::Core(kind) => primitive::try_read(*kind, reader, state),
            Converter::Payload(kind) => kind.try_read(reader, state),
            Converter::Nullable(c) => c.try_read(reader, state),
            Converter::Sequence(c) => c.try_read(reader, state),
            Converter::Map(c) => c.try_read(reader, state),
            Converter::Object(c) => c.try_read(reader, state),
            Converter::TypeInfo(c) => c.try_read(reader, state),
            Converter::Dynamic => dynamic::try_read(reader, state),
        }
    }

    /// Writes one value, or returns `false` after recording on `state` how
    /// much space the next window must offer.
    pub(crate) fn try_write(
        &self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        match self {
            Converter::Core(kind) => primitive::try_write(*kind, writer, state, value),
            Converter::Payload(kind) => kind.try_write(writer, state, value),
            Converter::Nullable(c) => c.try_write(writer, state, value),
            Converter::Sequence(c) => c.try_write(writer, state, value),
            Converter::Map(c) => c.try_write(writer, state, value),
            Converter::Object(c) => c.try_write(writer, state, value),
            Converter::TypeInfo(c) => c.try_write(writer, state, value),
            Converter::Dynamic => dynamic::try_write(writer, state, value),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::TypeInfo(c) => match c.expected_shape() {
                Some(shape) => write!(f, "Converter(typed {shape})"),
                None => f.write_str("Converter(skip)"),
            },
            _ => write!(f, "Converter({})", self.shape()),
        }
    }
}

/// Error for a value whose variant the converter cannot write.
pub(crate) fn mismatch(shape: Shape, value: &Value) -> CodecError {
    if value.is_null() {
        CodecError::UnexpectedNull { shape }
    } else {
        CodecError::ValueMismatch {
            shape,
            found: value.kind_name(),
        }
    }
}
