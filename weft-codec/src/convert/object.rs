// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Declared object types.
//!
//! Layout: `[marker][i32 field count][null-flags bitmap][fields]`. The
//! bitmap holds one bit per wire field (least significant bit first, set
//! when the field is null), so reference-typed fields carry no marker byte
//! of their own. With property names enabled each field is preceded by its
//! name as a marker-less string.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use super::collection::next_element;
use super::{Converter, PayloadKind, mismatch};
use crate::cursor::{ByteReader, ByteWriter, Incomplete};
use crate::error::{CodecError, Result};
use crate::shape::{FieldShape, ObjectShape, Shape};
use crate::state::{Accessor, FieldProgress, ObjectAccessor, ReadState, WriteState, null_bitmap};
use crate::value::{ObjectValue, Value};

const FIELD_NAME: Converter = Converter::Payload(PayloadKind::Text);

#[derive(Debug)]
pub(crate) struct FieldConverter {
    pub(crate) name: &'static str,
    pub(crate) name_value: Value,
    /// Position in declaration order.
    pub(crate) slot: usize,
    pub(crate) converter: Converter,
}

/// Everything an object converter needs once its field converters exist.
#[derive(Debug)]
pub(crate) struct ObjectLayout {
    declared: Vec<FieldShape>,
    wire: Vec<FieldConverter>,
    by_name: HashMap<&'static str, usize>,
    use_names: bool,
    /// Reads fields the type does not declare, when type info allows it.
    skip: Option<Converter>,
}

impl ObjectLayout {
    pub(crate) fn new(
        declared: Vec<FieldShape>,
        wire: Vec<FieldConverter>,
        use_names: bool,
        skip: Option<Converter>,
    ) -> Self {
        let by_name = wire
            .iter()
            .enumerate()
            .map(|(at, field)| (field.name, at))
            .collect();
        ObjectLayout {
            declared,
            wire,
            by_name,
            use_names,
            skip,
        }
    }

    fn resolve(
        &self,
        object: &'static str,
        index: usize,
        name: Option<&str>,
    ) -> Result<(Converter, Option<usize>)> {
        let found = match name {
            Some(name) => self.by_name.get(name).copied(),
            None => (index < self.wire.len()).then_some(index),
        };
        if let Some(at) = found {
            let field = &self.wire[at];
            return Ok((field.converter.clone(), Some(field.slot)));
        }
        let field = name.map_or_else(|| format!("#{index}"), str::to_owned);
        match &self.skip {
            Some(skip) => {
                debug!(object, field, "skipping undeclared field");
                Ok((skip.clone(), None))
            }
            None => Err(CodecError::UnknownField { object, field }),
        }
    }
}

#[derive(Debug)]
pub struct ObjectConverter {
    object: &'static ObjectShape,
    layout: OnceLock<ObjectLayout>,
}

impl ObjectConverter {
    /// Creates the converter before its fields are known, so that fields
    /// referring back to this type can be built against it.
    pub(crate) fn new(object: &'static ObjectShape) -> Self {
        ObjectConverter {
            object,
            layout: OnceLock::new(),
        }
    }

    pub(crate) fn set_layout(&self, layout: ObjectLayout) {
        // Only the build that created this converter sets it up.
        let _ = self.layout.set(layout);
    }

    pub fn object(&self) -> &'static ObjectShape {
        self.object
    }

    /// Wire names of the fields, in wire order.
    pub fn wire_order(&self) -> Vec<&'static str> {
        self.layout
            .get()
            .map(|layout| layout.wire.iter().map(|field| field.name).collect())
            .unwrap_or_default()
    }

    fn layout(&self) -> Result<&ObjectLayout> {
        self.layout.get().ok_or_else(|| CodecError::UnsupportedShape {
            shape: Shape::Object(self.object),
            reason: "converter used before its fields were set up".into(),
        })
    }

    pub(super) fn try_read(
        &self,
        reader: &mut ByteReader<'_>,
        state: &mut ReadState,
    ) -> Result<Option<Value>> {
        let layout = self.layout()?;
        let Some(is_null) = state.try_read_null_marker(reader)? else {
            return Ok(None);
        };
        if is_null {
            return Err(CodecError::UnexpectedNull {
                shape: Shape::Object(self.object),
            });
        }
        let Some(count) = state.try_read_length(reader, "field")? else {
            return Ok(None);
        };
        let drain = state.is_draining();
        let mut object = match std::mem::take(&mut state.frame_mut().accessor) {
            Accessor::Object(object) => object,
            _ => ObjectAccessor::new(layout.declared.len(), drain),
        };
        if !object.has_null_bits() {
            match reader.try_read_exact(count.div_ceil(8)) {
                Ok(bits) => object.set_null_bits(bits),
                Err(Incomplete(needed)) => {
                    state.set_bytes_needed(needed);
                    return Ok(suspend(state, object));
                }
            }
        }
        while object.read() < count {
            let index = object.read();
            let field = object.field.get_or_insert_with(FieldProgress::default);
            if layout.use_names && field.name.is_none() {
                // Names are needed to find the field even while draining.
                match state.read_with(reader, &FIELD_NAME, Some(false), false)? {
                    Some(Value::String(name)) => field.name = Some(name),
                    Some(other) => return Err(CodecError::type_mismatch("string", other.kind_name())),
                    None => return Ok(suspend(state, object)),
                }
            }
            let (converter, slot) = match &field.target {
                Some(target) => target.clone(),
                None => {
                    let target = layout.resolve(self.object.name, index, field.name.as_deref())?;
                    field.target = Some(target.clone());
                    target
                }
            };
            let null_flag = object.is_null(index);
            match state.read_nested(reader, &converter, Some(null_flag))? {
                Some(value) => object.complete_field(slot, value),
                None => return Ok(suspend(state, object)),
            }
        }
        let Some(slots) = object.finish() else {
            return Ok(Some(Value::Null));
        };
        let fields = layout
            .declared
            .iter()
            .zip(slots)
            .map(|(field, slot)| slot.unwrap_or_else(|| field.shape.default_value()))
            .collect();
        Ok(Some(Value::Object(ObjectValue {
            type_name: self.object.name,
            fields,
        })))
    }

    pub(super) fn try_write(
        &self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        let layout = self.layout()?;
        let object = match value {
            Value::Object(object) if object.type_name == self.object.name => object,
            Value::Object(object) => {
                return Err(CodecError::type_mismatch(self.object.name, object.type_name));
            }
            other => return Err(mismatch(Shape::Object(self.object), other)),
        };
        if object.fields.len() != layout.declared.len() {
            return Err(CodecError::invalid_value(
                Shape::Object(self.object),
                format!(
                    "{} field values for {} declared fields",
                    object.fields.len(),
                    layout.declared.len()
                ),
            ));
        }
        if !state.try_write_null_marker(writer, false)? {
            return Ok(false);
        }
        let Some(count) = state.try_write_length(writer, layout.wire.len(), "field")? else {
            return Ok(false);
        };
        // Step zero is the bitmap, then one or two steps per field.
        let per_field = 1 + usize::from(layout.use_names);
        while let Some(step) = next_element(state, 1 + count * per_field) {
            let done = if step == 0 {
                let bits = null_bitmap(
                    layout
                        .wire
                        .iter()
                        .map(|field| object.fields[field.slot].is_null()),
                );
                match writer.try_write_bytes(&bits) {
                    Ok(()) => true,
                    Err(Incomplete(needed)) => {
                        state.set_bytes_needed(needed);
                        false
                    }
                }
            } else {
                let field = &layout.wire[(step - 1) / per_field];
                if layout.use_names && (step - 1) % per_field == 0 {
                    state.write_nested(writer, &FIELD_NAME, &field.name_value, Some(false))?
                } else {
                    let value = &object.fields[field.slot];
                    state.write_nested(writer, &field.converter, value, Some(value.is_null()))?
                }
            };
            if !done {
                return Ok(false);
            }
            state.frame_mut().enumerator_in_progress = false;
        }
        Ok(true)
    }
}

fn suspend(state: &mut ReadState, object: ObjectAccessor) -> Option<Value> {
    state.frame_mut().accessor = Accessor::Object(object);
    None
}
