// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::shape::Shape;

/// Structural failures of the codec.
///
/// Running out of input or output space is not represented here: cursors
/// report it through [`Incomplete`](crate::cursor::Incomplete) and the
/// state records it as `bytes_needed`.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid null marker: expected 0x00 or 0x01, got {marker:#04x}")]
    InvalidMarker { marker: u8 },

    #[error("Bad state: null value for non-nullable {shape}")]
    UnexpectedNull { shape: Shape },

    #[error("Negative {kind} length: {length}")]
    NegativeLength { kind: &'static str, length: i32 },

    #[error("{kind} length {length} exceeds maximum {max}")]
    LengthLimit {
        kind: &'static str,
        length: usize,
        max: usize,
    },

    #[error("Values nested deeper than {max} levels")]
    DepthLimit { max: usize },

    #[error("Invalid {shape} value: {reason}")]
    InvalidValue { shape: Shape, reason: String },

    #[error("Invalid UTF-8 in string: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Unsupported shape {shape}: {reason}")]
    UnsupportedShape { shape: Shape, reason: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unknown field {field} on {object} and no type information to skip it")]
    UnknownField { object: &'static str, field: String },

    #[error("Value mismatch: {shape} converter cannot write {found}")]
    ValueMismatch { shape: Shape, found: &'static str },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Invalid type descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Unexpected end of input: {needed} more bytes required")]
    UnexpectedEof { needed: usize },

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn invalid_value(shape: Shape, reason: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            shape,
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        CodecError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
