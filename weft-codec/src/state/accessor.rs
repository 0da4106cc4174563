// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Per-frame accumulators that survive suspension.
//!
//! Converters take the accessor out of their frame, work on it, and put it
//! back before suspending.

use crate::convert::Converter;
use crate::value::Value;

/// Upper bound on speculative allocation driven by a length prefix.
const MAX_PREALLOC: usize = 1024;

#[derive(Debug, Default)]
pub(crate) enum Accessor {
    #[default]
    Empty,
    Payload(PayloadAccessor),
    Sequence(SequenceAccessor),
    Map(MapAccessor),
    Object(ObjectAccessor),
    /// Bytes of a split payload already written.
    Written(usize),
    /// Converter chosen from a type descriptor, and whether its value is
    /// being drained.
    Resolved(Converter, bool),
}

/// String or byte-array payload collected across windows.
#[derive(Debug)]
pub(crate) struct PayloadAccessor {
    data: Option<Vec<u8>>,
    len: usize,
    filled: usize,
}

impl PayloadAccessor {
    pub(crate) fn new(len: usize, drain: bool) -> Self {
        PayloadAccessor {
            data: (!drain).then(|| Vec::with_capacity(len.min(MAX_PREALLOC * 64))),
            len,
            filled: 0,
        }
    }

    pub(crate) fn extend(&mut self, chunk: &[u8]) {
        if let Some(data) = &mut self.data {
            data.extend_from_slice(chunk);
        }
        self.filled += chunk.len();
    }

    pub(crate) fn missing(&self) -> usize {
        self.len - self.filled
    }

    /// The collected bytes, or `None` when draining.
    pub(crate) fn finish(self) -> Option<Vec<u8>> {
        self.data
    }
}

#[derive(Debug)]
pub(crate) struct SequenceAccessor {
    items: Option<Vec<Value>>,
    count: usize,
}

impl SequenceAccessor {
    pub(crate) fn new(len: usize, drain: bool) -> Self {
        SequenceAccessor {
            items: (!drain).then(|| Vec::with_capacity(len.min(MAX_PREALLOC))),
            count: 0,
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn push(&mut self, item: Value) {
        if let Some(items) = &mut self.items {
            items.push(item);
        }
        self.count += 1;
    }

    pub(crate) fn finish(self) -> Option<Vec<Value>> {
        self.items
    }
}

#[derive(Debug)]
pub(crate) struct MapAccessor {
    pairs: Option<Vec<(Value, Value)>>,
    count: usize,
    pub(crate) pending_key: Option<Value>,
}

impl MapAccessor {
    pub(crate) fn new(len: usize, drain: bool) -> Self {
        MapAccessor {
            pairs: (!drain).then(|| Vec::with_capacity(len.min(MAX_PREALLOC))),
            count: 0,
            pending_key: None,
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Completes the pair started by the pending key.
    pub(crate) fn push_value(&mut self, value: Value) {
        let key = self.pending_key.take().unwrap_or(Value::Null);
        if let Some(pairs) = &mut self.pairs {
            pairs.push((key, value));
        }
        self.count += 1;
    }

    pub(crate) fn finish(self) -> Option<Vec<(Value, Value)>> {
        self.pairs
    }
}

/// Field being read: its name once known, then its converter and the
/// declaration slot it fills, if any.
#[derive(Debug, Default)]
pub(crate) struct FieldProgress {
    pub(crate) name: Option<String>,
    pub(crate) target: Option<(Converter, Option<usize>)>,
}

#[derive(Debug)]
pub(crate) struct ObjectAccessor {
    null_bits: Option<Vec<u8>>,
    /// Declaration-order slots, absent when draining.
    slots: Option<Vec<Option<Value>>>,
    read: usize,
    pub(crate) field: Option<FieldProgress>,
}

impl ObjectAccessor {
    pub(crate) fn new(declared: usize, drain: bool) -> Self {
        ObjectAccessor {
            null_bits: None,
            slots: (!drain).then(|| vec![None; declared]),
            read: 0,
            field: None,
        }
    }

    pub(crate) fn has_null_bits(&self) -> bool {
        self.null_bits.is_some()
    }

    pub(crate) fn set_null_bits(&mut self, bits: &[u8]) {
        self.null_bits = Some(bits.to_vec());
    }

    /// Bit `index` of the null-flags bitmap, least significant bit first.
    pub(crate) fn is_null(&self, index: usize) -> bool {
        self.null_bits
            .as_ref()
            .and_then(|bits| bits.get(index / 8))
            .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
    }

    pub(crate) fn read(&self) -> usize {
        self.read
    }

    pub(crate) fn complete_field(&mut self, slot: Option<usize>, value: Value) {
        if let (Some(slots), Some(slot)) = (&mut self.slots, slot) {
            slots[slot] = Some(value);
        }
        self.read += 1;
        self.field = None;
    }

    pub(crate) fn finish(self) -> Option<Vec<Option<Value>>> {
        self.slots
    }
}

/// Packs `flags` into a bitmap of `ceil(len / 8)` bytes.
pub(crate) fn null_bitmap(flags: impl ExactSizeIterator<Item = bool>) -> Vec<u8> {
    let mut bits = vec![0u8; flags.len().div_ceil(8)];
    for (index, flag) in flags.enumerate() {
        if flag {
            bits[index / 8] |= 1 << (index % 8);
        }
    }
    bits
}
