// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use tracing::debug;

use super::Converter;
use crate::cursor::{ByteReader, ByteWriter};
use crate::descriptor;
use crate::error::{CodecError, Result};
use crate::shape::Shape;
use crate::state::{Accessor, ReadState, WriteState};
use crate::value::Value;

/// Prefixes a field with the descriptor of its declared shape.
///
/// On read the descriptor decides what is actually on the wire. If it
/// matches the declared shape the field is read normally; otherwise the
/// value is read with a converter for the wire shape, discarded, and the
/// field gets its default. Without a declared shape this is the converter
/// used to skip fields the object type does not declare.
#[derive(Debug)]
pub struct TypeInfoConverter {
    expected: Option<(Converter, Shape)>,
    descriptor: Vec<u8>,
}

impl TypeInfoConverter {
    pub(crate) fn new(expected: Converter) -> Result<Self> {
        let shape = expected.shape();
        let descriptor = descriptor::encode(&shape)?;
        Ok(TypeInfoConverter {
            expected: Some((expected, shape)),
            descriptor,
        })
    }

    pub(crate) fn skipping() -> Self {
        TypeInfoConverter {
            expected: None,
            descriptor: Vec::new(),
        }
    }

    pub fn expected_shape(&self) -> Option<&Shape> {
        self.expected.as_ref().map(|(_, shape)| shape)
    }

    pub(super) fn try_read(
        &self,
        reader: &mut ByteReader<'_>,
        state: &mut ReadState,
    ) -> Result<Option<Value>> {
        let (converter, drain) = match std::mem::take(&mut state.frame_mut().accessor) {
            Accessor::Resolved(converter, drain) => (converter, drain),
            _ => {
                let blob = ready!(state, reader.try_read_blob());
                let factory = state.factory().clone();
                let wire = descriptor::decode(blob, &|name| factory.lookup_object(name))?;
                match &self.expected {
                    Some((converter, shape)) if *shape == wire => (converter.clone(), false),
                    expected => {
                        debug!(
                            wire = %wire,
                            expected = ?expected.as_ref().map(|(_, shape)| shape.to_string()),
                            "draining field of unexpected type"
                        );
                        (factory.get_transient(&wire)?, true)
                    }
                }
            }
        };
        let null_flag = state.frame().null_flag;
        let value = if drain {
            state.read_drained(reader, &converter, null_flag)?
        } else {
            state.read_nested(reader, &converter, null_flag)?
        };
        let Some(value) = value else {
            state.frame_mut().accessor = Accessor::Resolved(converter, drain);
            return Ok(None);
        };
        if !drain {
            return Ok(Some(value));
        }
        Ok(Some(match &self.expected {
            Some((_, shape)) => shape.default_value(),
            None => Value::Null,
        }))
    }

    pub(super) fn try_write(
        &self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        let Some((converter, _)) = &self.expected else {
            return Err(CodecError::UnsupportedShape {
                shape: Shape::Dynamic,
                reason: "the skip converter cannot write".into(),
            });
        };
        if !state.frame().has_type_info {
            ready!(state, writer.try_write_blob(&self.descriptor));
            state.frame_mut().has_type_info = true;
        }
        let null_flag = state.frame().null_flag;
        state.write_nested(writer, converter, value, null_flag)
    }
}
