// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tracing::trace;

use super::{Frame, FrameStack};
use crate::convert::Converter;
use crate::cursor::ByteReader;
use crate::error::{CodecError, Result};
use crate::factory::ConverterFactory;
use crate::options::CodecOptions;
use crate::value::Value;

/// Progress of one value being deserialised.
///
/// After an error the state is meaningless and must be [`reset`] before it
/// is used again.
///
/// [`reset`]: ReadState::reset
#[derive(Debug)]
pub struct ReadState {
    factory: Arc<ConverterFactory>,
    stack: FrameStack,
}

impl ReadState {
    pub fn new(factory: Arc<ConverterFactory>) -> Self {
        ReadState {
            factory,
            stack: FrameStack::default(),
        }
    }

    pub fn factory(&self) -> &Arc<ConverterFactory> {
        &self.factory
    }

    pub fn options(&self) -> &CodecOptions {
        self.factory.options()
    }

    /// Bytes the last suspended primitive needs beyond what it was given.
    pub fn bytes_needed(&self) -> usize {
        self.stack.bytes_needed
    }

    pub(crate) fn set_bytes_needed(&mut self, needed: usize) {
        self.stack.bytes_needed = needed;
    }

    /// Frames of the values still in flight, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.stack.frames
    }

    /// Whether the value currently being read is discarded.
    pub fn is_draining(&self) -> bool {
        self.stack.draining()
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Starts or resumes reading the top-level value.
    pub fn read_root(
        &mut self,
        reader: &mut ByteReader<'_>,
        converter: &Converter,
    ) -> Result<Option<Value>> {
        self.stack.depth = 0;
        self.stack.bytes_needed = 0;
        let value = self.read_nested(reader, converter, None)?;
        if value.is_none() {
            trace!(
                consumed = reader.position(),
                needed = self.stack.bytes_needed,
                frames = self.stack.frames.len(),
                "read suspended"
            );
        }
        Ok(value)
    }

    /// Reads a child value, resuming its frame if an earlier call left one.
    ///
    /// `None` means the input ran out; the caller must suspend as well.
    pub fn read_nested(
        &mut self,
        reader: &mut ByteReader<'_>,
        converter: &Converter,
        null_flag: Option<bool>,
    ) -> Result<Option<Value>> {
        let drain = self.stack.draining();
        self.read_with(reader, converter, null_flag, drain)
    }

    /// Reads a child value only to advance past it.
    pub fn read_drained(
        &mut self,
        reader: &mut ByteReader<'_>,
        converter: &Converter,
        null_flag: Option<bool>,
    ) -> Result<Option<Value>> {
        self.read_with(reader, converter, null_flag, true)
    }

    pub(crate) fn read_with(
        &mut self,
        reader: &mut ByteReader<'_>,
        converter: &Converter,
        null_flag: Option<bool>,
        drain: bool,
    ) -> Result<Option<Value>> {
        let max_depth = self.options().max_depth;
        self.stack.push(converter, null_flag, drain, max_depth)?;
        let value = converter.try_read(reader, self)?;
        if value.is_some() {
            self.stack.pop();
        } else {
            self.stack.suspend();
        }
        Ok(value)
    }

    pub(crate) fn frame(&self) -> &Frame {
        self.stack.current()
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        self.stack.current_mut()
    }

    /// Reads the current value's null marker once; later calls for the same
    /// frame return the latched answer. A null flag from the parent bitmap
    /// stands in for the marker byte.
    pub(crate) fn try_read_null_marker(
        &mut self,
        reader: &mut ByteReader<'_>,
    ) -> Result<Option<bool>> {
        let frame = self.stack.current();
        if frame.has_null_checked {
            return Ok(Some(frame.is_null));
        }
        let is_null = match frame.null_flag {
            Some(flag) => flag,
            None => match ready!(self, reader.try_read_u8()) {
                0 => true,
                1 => false,
                marker => return Err(CodecError::InvalidMarker { marker }),
            },
        };
        let frame = self.stack.current_mut();
        frame.has_null_checked = true;
        frame.is_null = is_null;
        Ok(Some(is_null))
    }

    /// Element or field count of the current value, read once.
    pub(crate) fn try_read_length(
        &mut self,
        reader: &mut ByteReader<'_>,
        kind: &'static str,
    ) -> Result<Option<usize>> {
        if let Some(len) = self.stack.current().enumerable_length {
            return Ok(Some(len));
        }
        let max = self.options().max_collection_length;
        let Some(len) = self.read_length(reader, kind, max)? else {
            return Ok(None);
        };
        self.stack.current_mut().enumerable_length = Some(len);
        Ok(Some(len))
    }

    /// Payload length of the current string or byte array, read once.
    pub(crate) fn try_read_string_length(
        &mut self,
        reader: &mut ByteReader<'_>,
        kind: &'static str,
    ) -> Result<Option<usize>> {
        if let Some(len) = self.stack.current().string_length {
            return Ok(Some(len));
        }
        let max = self.options().max_string_length;
        let Some(len) = self.read_length(reader, kind, max)? else {
            return Ok(None);
        };
        self.stack.current_mut().string_length = Some(len);
        Ok(Some(len))
    }

    fn read_length(
        &mut self,
        reader: &mut ByteReader<'_>,
        kind: &'static str,
        max: usize,
    ) -> Result<Option<usize>> {
        let length = ready!(self, reader.try_read_i32());
        let len =
            usize::try_from(length).map_err(|_| CodecError::NegativeLength { kind, length })?;
        if len > max {
            return Err(CodecError::LengthLimit {
                kind,
                length: len,
                max,
            });
        }
        Ok(Some(len))
    }
}
