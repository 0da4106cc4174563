// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Resumable streaming binary serialization.
//!
//! Values are read from and written to caller-supplied byte windows of any
//! size. When a window runs out mid-value the codec records how far it got
//! and how many more bytes it needs, and the next call with a fresh window
//! carries on from there. No byte is ever read or written twice.
//!
//! # Layers
//!
//! - [`cursor`] - primitive reads and writes over one window
//! - [`state`] - the per-value frame stack that makes calls resumable
//! - [`convert`] - immutable converters, one per [`Shape`]
//! - [`factory`] - builds and caches converters per [`CodecOptions`]
//! - [`wire`] - maps Rust types to shapes and [`Value`]s
//! - [`codec`] - [`Decoder`], [`Encoder`] and one-shot helpers
//!
//! # Example
//!
//! ```
//! use weft_codec::{CodecOptions, Decoded, Decoder, serialize, wire_object};
//!
//! #[derive(Debug, PartialEq)]
//! struct Greeting {
//!     text: String,
//!     repeat: u32,
//! }
//!
//! wire_object!(Greeting { text: String, repeat: u32 });
//!
//! let options = CodecOptions::default();
//! let value = Greeting { text: "hello".into(), repeat: 3 };
//! let bytes = serialize(&value, &options).unwrap();
//!
//! let mut decoder = Decoder::<Greeting>::new(&options).unwrap();
//! let (head, tail) = bytes.split_at(12);
//! let Decoded::Incomplete { consumed, .. } = decoder.decode(head).unwrap() else {
//!     panic!("twelve bytes cannot hold the whole value");
//! };
//! // The partial string payload is absorbed, not left behind.
//! assert_eq!(consumed, 12);
//! assert_eq!(
//!     decoder.decode(tail).unwrap(),
//!     Decoded::Complete { value, consumed: tail.len() }
//! );
//! ```

/// Unwraps a cursor result, or records the shortfall on the state and
/// suspends the enclosing converter.
macro_rules! ready {
    ($state:expr, $op:expr) => {
        match $op {
            Ok(value) => value,
            Err($crate::cursor::Incomplete(needed)) => {
                $state.set_bytes_needed(needed);
                return Ok(Default::default());
            }
        }
    };
}

pub mod codec;
pub mod convert;
pub mod cursor;
pub mod decimal;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod options;
pub mod shape;
pub mod state;
pub mod value;
pub mod wire;

#[cfg(any(test, feature = "test"))]
pub mod arbitrary;

pub use codec::{Decoded, Decoder, Encoded, Encoder, deserialize, deserialize_from_reader, serialize};
pub use convert::Converter;
pub use decimal::Decimal;
pub use error::{CodecError, Result};
pub use factory::ConverterFactory;
pub use options::CodecOptions;
pub use shape::{CoreKind, FieldShape, ObjectShape, Shape};
pub use value::{ObjectValue, Value};
pub use wire::WireType;
