// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Async entry points for the weft codec: single values over
//! `AsyncRead`/`AsyncWrite`, a framed codec for streams of values, and
//! configuration loading.

pub mod config;
pub mod error;
pub mod framed;
pub mod stream;

pub use config::{CONFIG_ENV, StreamConfig};
pub use error::{ConfigError, Result, StreamError};
pub use framed::WireCodec;
pub use stream::{read_value, write_value};
