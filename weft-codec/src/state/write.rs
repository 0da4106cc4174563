// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tracing::trace;

use super::{Frame, FrameStack};
use crate::convert::Converter;
use crate::cursor::ByteWriter;
use crate::error::{CodecError, Result};
use crate::factory::ConverterFactory;
use crate::options::CodecOptions;
use crate::value::Value;

/// Progress of one value being serialised.
#[derive(Debug)]
pub struct WriteState {
    factory: Arc<ConverterFactory>,
    stack: FrameStack,
}

impl WriteState {
    pub fn new(factory: Arc<ConverterFactory>) -> Self {
        WriteState {
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

    /// Free space the next output window needs for the suspended primitive
    /// to make progress.
    pub fn bytes_needed(&self) -> usize {
        self.stack.bytes_needed
    }

    pub(crate) fn set_bytes_needed(&mut self, needed: usize) {
        self.stack.bytes_needed = needed;
    }

    pub fn frames(&self) -> &[Frame] {
        &self.stack.frames
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// Starts or resumes writing the top-level value.
    pub fn write_root(
        &mut self,
        writer: &mut ByteWriter<'_>,
        converter: &Converter,
        value: &Value,
    ) -> Result<bool> {
        self.stack.depth = 0;
        self.stack.bytes_needed = 0;
        let done = self.write_nested(writer, converter, value, None)?;
        if !done {
            trace!(
                written = writer.position(),
                needed = self.stack.bytes_needed,
                frames = self.stack.frames.len(),
                "write suspended"
            );
        }
        Ok(done)
    }

    /// Writes a child value, resuming its frame if an earlier call left one.
    ///
    /// `false` means the window is full; the caller must suspend as well.
    pub fn write_nested(
        &mut self,
        writer: &mut ByteWriter<'_>,
        converter: &Converter,
        value: &Value,
        null_flag: Option<bool>,
    ) -> Result<bool> {
        let max_depth = self.options().max_depth;
        self.stack.push(converter, null_flag, false, max_depth)?;
        let done = converter.try_write(writer, self, value)?;
        if done {
            self.stack.pop();
        } else {
            self.stack.suspend();
        }
        Ok(done)
    }

    pub(crate) fn frame(&self) -> &Frame {
        self.stack.current()
    }

    pub(crate) fn frame_mut(&mut self) -> &mut Frame {
        self.stack.current_mut()
    }

    /// Writes the current value's null marker once. Nothing is written when
    /// the parent records nullness in its bitmap.
    pub(crate) fn try_write_null_marker(
        &mut self,
        writer: &mut ByteWriter<'_>,
        is_null: bool,
    ) -> Result<bool> {
        let frame = self.stack.current();
        if frame.has_written_is_null {
            return Ok(true);
        }
        if frame.null_flag.is_none() {
            ready!(self, writer.try_write_u8(if is_null { 0 } else { 1 }));
        }
        self.stack.current_mut().has_written_is_null = true;
        Ok(true)
    }

    /// Writes the element or field count once and returns the captured
    /// count on every call.
    pub(crate) fn try_write_length(
        &mut self,
        writer: &mut ByteWriter<'_>,
        len: usize,
        kind: &'static str,
    ) -> Result<Option<usize>> {
        if let Some(len) = self.stack.current().enumerable_length {
            return Ok(Some(len));
        }
        let max = self.options().max_collection_length;
        if !self.write_length(writer, len, kind, max)? {
            return Ok(None);
        }
        self.stack.current_mut().enumerable_length = Some(len);
        Ok(Some(len))
    }

    pub(crate) fn try_write_string_length(
        &mut self,
        writer: &mut ByteWriter<'_>,
        len: usize,
        kind: &'static str,
    ) -> Result<bool> {
        if self.stack.current().string_length.is_some() {
            return Ok(true);
        }
        let max = self.options().max_string_length;
        if !self.write_length(writer, len, kind, max)? {
            return Ok(false);
        }
        self.stack.current_mut().string_length = Some(len);
        Ok(true)
    }

    fn write_length(
        &mut self,
        writer: &mut ByteWriter<'_>,
        len: usize,
        kind: &'static str,
        max: usize,
    ) -> Result<bool> {
        let length = i32::try_from(len)
            .ok()
            .filter(|_| len <= max)
            .ok_or(CodecError::LengthLimit {
                kind,
                length: len,
                max: max.min(i32::MAX as usize),
            })?;
        ready!(self, writer.try_write_i32(length));
        Ok(true)
    }
}
