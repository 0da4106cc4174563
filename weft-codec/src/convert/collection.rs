// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Counted collections: `[marker][i32 count][elements]`.

use super::{Converter, mismatch};
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{CodecError, Result};
use crate::shape::Shape;
use crate::state::{Accessor, MapAccessor, ReadState, SequenceAccessor, WriteState};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Array,
    List,
    Set,
}

/// Arrays, lists and sets. They share a wire layout and differ only in the
/// value they produce.
#[derive(Debug)]
pub struct SequenceConverter {
    kind: SequenceKind,
    element: Converter,
    shape: Shape,
}

impl SequenceConverter {
    pub(crate) fn new(kind: SequenceKind, element: Converter) -> Self {
        let element_shape = element.shape();
        let shape = match kind {
            SequenceKind::Array => Shape::array(element_shape),
            SequenceKind::List => Shape::list(element_shape),
            SequenceKind::Set => Shape::set(element_shape),
        };
        SequenceConverter {
            kind,
            element,
            shape,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn element(&self) -> &Converter {
        &self.element
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
            return Err(CodecError::UnexpectedNull {
                shape: self.shape.clone(),
            });
        }
        let Some(len) = state.try_read_length(reader, "collection")? else {
            return Ok(None);
        };
        let drain = state.is_draining();
        let mut items = match std::mem::take(&mut state.frame_mut().accessor) {
            Accessor::Sequence(items) => items,
            _ => SequenceAccessor::new(len, drain),
        };
        while items.count() < len {
            match state.read_nested(reader, &self.element, None)? {
                Some(item) => items.push(item),
                None => {
                    state.frame_mut().accessor = Accessor::Sequence(items);
                    return Ok(None);
                }
            }
        }
        let value = match items.finish() {
            None => Value::Null,
            Some(items) => match self.kind {
                SequenceKind::Array => Value::Array(items),
                SequenceKind::List => Value::List(items),
                SequenceKind::Set => Value::Set(items),
            },
        };
        Ok(Some(value))
    }

    pub(super) fn try_write(
        &self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        let items = match (self.kind, value) {
            (SequenceKind::Array, Value::Array(items))
            | (SequenceKind::List, Value::List(items))
            | (SequenceKind::Set, Value::Set(items)) => items,
            (_, other) => return Err(mismatch(self.shape.clone(), other)),
        };
        if !state.try_write_null_marker(writer, false)? {
            return Ok(false);
        }
        let Some(len) = state.try_write_length(writer, items.len(), "collection")? else {
            return Ok(false);
        };
        while let Some(index) = next_element(state, len) {
            if !state.write_nested(writer, &self.element, &items[index], None)? {
                return Ok(false);
            }
            state.frame_mut().enumerator_in_progress = false;
        }
        Ok(true)
    }
}

/// Maps: `count` key/value pairs, each key followed by its value.
#[derive(Debug)]
pub struct MapConverter {
    key: Converter,
    value: Converter,
    shape: Shape,
}

impl MapConverter {
    pub(crate) fn new(key: Converter, value: Converter) -> Self {
        let shape = Shape::map(key.shape(), value.shape());
        MapConverter { key, value, shape }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
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
            return Err(CodecError::UnexpectedNull {
                shape: self.shape.clone(),
            });
        }
        let Some(len) = state.try_read_length(reader, "map")? else {
            return Ok(None);
        };
        let drain = state.is_draining();
        let mut pairs = match std::mem::take(&mut state.frame_mut().accessor) {
            Accessor::Map(pairs) => pairs,
            _ => MapAccessor::new(len, drain),
        };
        while pairs.count() < len {
            if pairs.pending_key.is_none() {
                match state.read_nested(reader, &self.key, None)? {
                    Some(key) => pairs.pending_key = Some(key),
                    None => {
                        state.frame_mut().accessor = Accessor::Map(pairs);
                        return Ok(None);
                    }
                }
            }
            match state.read_nested(reader, &self.value, None)? {
                Some(value) => pairs.push_value(value),
                None => {
                    state.frame_mut().accessor = Accessor::Map(pairs);
                    return Ok(None);
                }
            }
        }
        Ok(Some(pairs.finish().map_or(Value::Null, Value::Map)))
    }

    pub(super) fn try_write(
        &self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        let Value::Map(pairs) = value else {
            return Err(mismatch(self.shape.clone(), value));
        };
        if !state.try_write_null_marker(writer, false)? {
            return Ok(false);
        }
        let Some(len) = state.try_write_length(writer, pairs.len(), "map")? else {
            return Ok(false);
        };
        // Keys and values alternate as separate steps of one enumeration.
        while let Some(step) = next_element(state, 2 * len) {
            let (key, value) = &pairs[step / 2];
            let (converter, item) = if step % 2 == 0 {
                (&self.key, key)
            } else {
                (&self.value, value)
            };
            if !state.write_nested(writer, converter, item, None)? {
                return Ok(false);
            }
            state.frame_mut().enumerator_in_progress = false;
        }
        Ok(true)
    }
}

/// Advances the write enumerator of the current frame unless the element it
/// points at is still in progress. Returns the element to write.
pub(super) fn next_element(state: &mut WriteState, len: usize) -> Option<usize> {
    let frame = state.frame_mut();
    if !frame.enumerator_in_progress {
        if frame.enumerator == len {
            return None;
        }
        frame.enumerator += 1;
        frame.enumerator_in_progress = true;
    }
    Some(frame.enumerator - 1)
}
