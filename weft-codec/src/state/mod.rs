// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Resumable read and write state.
//!
//! A state owns a stack of [`Frame`]s, one per value in flight. Each call
//! into the codec replays the converter graph from the root: a converter
//! that finds an existing frame at its depth continues from that frame's
//! progress instead of starting over. Completed frames are popped; a
//! suspended converter leaves its frame (and those of its suspended
//! descendants) in place for the next call.

mod accessor;
mod frame;
mod read;
mod write;

pub(crate) use accessor::{
    Accessor, FieldProgress, MapAccessor, ObjectAccessor, PayloadAccessor, SequenceAccessor,
    null_bitmap,
};
pub use frame::Frame;
pub use read::ReadState;
pub use write::WriteState;

use crate::convert::Converter;
use crate::error::{CodecError, Result};

#[derive(Debug, Default)]
struct FrameStack {
    frames: Vec<Frame>,
    depth: usize,
    bytes_needed: usize,
}

impl FrameStack {
    /// Enters a frame for `converter`, resuming the one left at this depth
    /// by an earlier call if there is one. A new frame beyond `max_depth`
    /// is refused.
    fn push(
        &mut self,
        converter: &Converter,
        null_flag: Option<bool>,
        drain: bool,
        max_depth: usize,
    ) -> Result<()> {
        if let Some(frame) = self.frames.get(self.depth) {
            debug_assert!(
                frame.converter.ptr_eq(converter),
                "resumed frame belongs to {:?}, not {:?}",
                frame.converter,
                converter
            );
        } else if self.depth >= max_depth {
            return Err(CodecError::DepthLimit { max: max_depth });
        } else {
            self.frames.push(Frame::new(converter.clone(), null_flag, drain));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves a completed frame.
    fn pop(&mut self) {
        self.depth -= 1;
        self.frames.truncate(self.depth);
    }

    /// Leaves a suspended frame in place.
    fn suspend(&mut self) {
        self.depth -= 1;
    }

    fn current(&self) -> &Frame {
        &self.frames[self.depth - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.depth - 1]
    }

    /// Whether the frame being entered inherits drain mode.
    fn draining(&self) -> bool {
        self.depth > 0 && self.current().drain
    }

    fn clear(&mut self) {
        self.frames.clear();
        self.depth = 0;
        self.bytes_needed = 0;
    }
}
