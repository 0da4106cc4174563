// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use crate::convert::Converter;

use super::accessor::Accessor;

/// Progress of one in-flight value.
///
/// All fields are one-shot latches or monotonically advancing counters, so
/// replaying the converter call graph from the root skips work that an
/// earlier, suspended call already did.
#[derive(Debug)]
pub struct Frame {
    pub(crate) converter: Converter,
    /// Nullness taken from the parent's null-flags bitmap, if any.
    pub(crate) null_flag: Option<bool>,
    /// Advance the cursor without materialising anything.
    pub(crate) drain: bool,
    pub(crate) has_null_checked: bool,
    pub(crate) is_null: bool,
    pub(crate) has_written_is_null: bool,
    pub(crate) has_type_info: bool,
    pub(crate) enumerable_length: Option<usize>,
    pub(crate) string_length: Option<usize>,
    /// Position of the next element to start writing.
    pub(crate) enumerator: usize,
    pub(crate) enumerator_in_progress: bool,
    pub(crate) accessor: Accessor,
}

impl Frame {
    pub(crate) fn new(converter: Converter, null_flag: Option<bool>, drain: bool) -> Self {
        Frame {
            converter,
            null_flag,
            drain,
            has_null_checked: false,
            is_null: false,
            has_written_is_null: false,
            has_type_info: false,
            enumerable_length: None,
            string_length: None,
            enumerator: 0,
            enumerator_in_progress: false,
            accessor: Accessor::Empty,
        }
    }
}
