// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Length-prefixed payloads: `[marker][i32 length][bytes]`.
//!
//! Unlike fixed-width values, a payload may be split at any byte boundary;
//! the part already transferred is kept in the frame.

use bytes::Bytes;

use super::mismatch;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{CodecError, Result};
use crate::shape::Shape;
use crate::state::{Accessor, PayloadAccessor, ReadState, WriteState};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// UTF-8 text.
    Text,
    /// Raw bytes, copied in bulk.
    Binary,
}

impl PayloadKind {
    pub fn shape(self) -> Shape {
        match self {
            PayloadKind::Text => Shape::String,
            PayloadKind::Binary => Shape::Bytes,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PayloadKind::Text => "string",
            PayloadKind::Binary => "byte array",
        }
    }

    pub(super) fn try_read(
        self,
        reader: &mut ByteReader<'_>,
        state: &mut ReadState,
    ) -> Result<Option<Value>> {
        let Some(is_null) = state.try_read_null_marker(reader)? else {
            return Ok(None);
        };
        if is_null {
            return Err(CodecError::UnexpectedNull {
                shape: self.shape(),
            });
        }
        let Some(len) = state.try_read_string_length(reader, self.name())? else {
            return Ok(None);
        };
        let drain = state.is_draining();
        let mut payload = match std::mem::take(&mut state.frame_mut().accessor) {
            Accessor::Payload(payload) => payload,
            _ => PayloadAccessor::new(len, drain),
        };
        payload.extend(reader.read_partial(payload.missing()));
        if payload.missing() > 0 {
            state.set_bytes_needed(payload.missing());
            state.frame_mut().accessor = Accessor::Payload(payload);
            return Ok(None);
        }
        let Some(data) = payload.finish() else {
            return Ok(Some(Value::Null));
        };
        let value = match self {
            PayloadKind::Text => Value::String(String::from_utf8(data)?),
            PayloadKind::Binary => Value::Bytes(Bytes::from(data)),
        };
        Ok(Some(value))
    }

    pub(super) fn try_write(
        self,
        writer: &mut ByteWriter<'_>,
        state: &mut WriteState,
        value: &Value,
    ) -> Result<bool> {
        let data: &[u8] = match (self, value) {
            (PayloadKind::Text, Value::String(s)) => s.as_bytes(),
            (PayloadKind::Binary, Value::Bytes(b)) => &b[..],
            (_, other) => return Err(mismatch(self.shape(), other)),
        };
        if !state.try_write_null_marker(writer, false)? {
            return Ok(false);
        }
        if !state.try_write_string_length(writer, data.len(), self.name())? {
            return Ok(false);
        }
        let done = match state.frame().accessor {
            Accessor::Written(done) => done,
            _ => 0,
        };
        let done = done + writer.write_partial(&data[done..]);
        if done < data.len() {
            state.set_bytes_needed(data.len() - done);
            state.frame_mut().accessor = Accessor::Written(done);
            return Ok(false);
        }
        Ok(true)
    }
}
