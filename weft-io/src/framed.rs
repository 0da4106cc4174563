// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! A `tokio_util` codec for streams of consecutive values.

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use tokio_util::codec;
use tracing::trace;
use weft_codec::{CodecOptions, ConverterFactory, Decoder, Encoded, Encoder, WireType};

use crate::error::{Result, StreamError};

const MIN_WINDOW: usize = 64;

/// Decodes and encodes values of type `T` back to back, with no framing of
/// their own. A value split across socket reads is resumed, not re-parsed.
pub struct WireCodec<T> {
    factory: Arc<ConverterFactory>,
    decoder: Decoder<T>,
}

impl<T: WireType> WireCodec<T> {
    pub fn new(options: &CodecOptions) -> Result<Self> {
        Self::with_factory(ConverterFactory::shared(options))
    }

    pub fn with_factory(factory: Arc<ConverterFactory>) -> Result<Self> {
        let decoder = Decoder::with_factory(factory.clone())?;
        Ok(WireCodec { factory, decoder })
    }
}

impl<T: WireType> fmt::Debug for WireCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireCodec")
            .field("options", self.factory.options())
            .field("bytes_needed", &self.decoder.bytes_needed())
            .finish()
    }
}

impl<T: WireType> codec::Decoder for WireCodec<T> {
    type Item = T;
    type Error = StreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        if src.is_empty() && !self.decoder.in_progress() {
            return Ok(None);
        }
        let value = self.decoder.decode_buf(src)?;
        if value.is_none() {
            let needed = self.decoder.bytes_needed();
            trace!(buffered = src.len(), needed, "waiting for more input");
            src.reserve(needed);
        }
        Ok(value)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        if let Some(value) = self.decode(src)? {
            return Ok(Some(value));
        }
        if src.is_empty() && !self.decoder.in_progress() {
            return Ok(None);
        }
        Err(StreamError::UnexpectedEof {
            needed: self.decoder.bytes_needed(),
        })
    }
}

impl<T: WireType> codec::Encoder<T> for WireCodec<T> {
    type Error = StreamError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<()> {
        let mut encoder = Encoder::with_factory(&item, self.factory.clone())?;
        let mut window = (dst.capacity() - dst.len()).max(MIN_WINDOW);
        loop {
            let start = dst.len();
            dst.resize(start + window, 0);
            match encoder.encode(&mut dst[start..])? {
                Encoded::Complete { written } => {
                    dst.truncate(start + written);
                    return Ok(());
                }
                Encoded::Incomplete { written, needed } => {
                    dst.truncate(start + written);
                    window = (window * 2).max(needed);
                }
            }
        }
    }
}

#[cfg(test)]
mod unittests {
    use codec::{Decoder as _, Encoder as _};
    use hex_literal::hex;
    use weft_codec::CodecError;

    use super::*;

    #[test]
    fn partial_frames_wait_for_more() {
        let mut codec = WireCodec::<Vec<u16>>::new(&CodecOptions::default()).unwrap();
        let mut buf = BytesMut::from(&hex!("01 02000000 07")[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        // Only the unfinished element is left behind.
        assert_eq!(&buf[..], hex!("07"));
        buf.extend_from_slice(&hex!("00 0800 01"));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(vec![7, 8]));
        assert_eq!(&buf[..], hex!("01"));
    }

    #[test]
    fn clean_end_of_stream() {
        let mut codec = WireCodec::<u8>::new(&CodecOptions::default()).unwrap();
        assert_eq!(codec.decode_eof(&mut BytesMut::new()).unwrap(), None);
    }

    #[test]
    fn end_of_stream_inside_a_value() {
        let mut codec = WireCodec::<u32>::new(&CodecOptions::default()).unwrap();
        let mut buf = BytesMut::from(&hex!("0102")[..]);
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(err, StreamError::UnexpectedEof { needed: 2 }), "{err}");
    }

    #[test]
    fn codec_errors_pass_through() {
        let mut codec = WireCodec::<String>::new(&CodecOptions::default()).unwrap();
        let mut buf = BytesMut::from(&hex!("05")[..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(
            matches!(err, StreamError::Codec(CodecError::InvalidMarker { marker: 5 })),
            "{err}"
        );
    }

    #[test]
    fn encodes_values_back_to_back() {
        let mut codec = WireCodec::<String>::new(&CodecOptions::default()).unwrap();
        let mut dst = BytesMut::new();
        codec.encode("a".to_string(), &mut dst).unwrap();
        codec.encode("x".repeat(100), &mut dst).unwrap();
        assert_eq!(&dst[..6], hex!("01 01000000 61"));
        assert_eq!(dst.len(), 6 + 5 + 100);
        assert_eq!(codec.decode(&mut dst).unwrap().as_deref(), Some("a"));
        assert_eq!(codec.decode(&mut dst).unwrap(), Some("x".repeat(100)));
        assert!(dst.is_empty());
    }
}
