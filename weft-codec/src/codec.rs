// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Entry points: resumable decoders and encoders over caller-owned windows,
//! and one-shot helpers built on them.

use std::io::{self, Read};
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use crate::convert::Converter;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::{CodecError, Result};
use crate::factory::ConverterFactory;
use crate::options::CodecOptions;
use crate::shape::Shape;
use crate::state::{ReadState, WriteState};
use crate::value::Value;
use crate::wire::WireType;

const INITIAL_WINDOW: usize = 256;

/// Outcome of feeding one window to a [`Decoder`].
#[derive(Debug, PartialEq)]
pub enum Decoded<T> {
    Complete { value: T, consumed: usize },
    /// Everything up to `consumed` has been absorbed. The next window must
    /// start with the unconsumed tail and hold at least `needed` more bytes
    /// for the decoder to make progress.
    Incomplete { consumed: usize, needed: usize },
}

/// Outcome of handing one output window to an [`Encoder`].
#[derive(Debug, PartialEq, Eq)]
pub enum Encoded {
    Complete { written: usize },
    /// The first `written` bytes of the window are final. The next window
    /// must offer at least `needed` bytes of free space.
    Incomplete { written: usize, needed: usize },
}

/// Reads one `T` from input that arrives in arbitrary pieces.
///
/// After a value completes the decoder starts over, so it can be fed a
/// stream of consecutive values. After an error it also starts over; the
/// input position is then unspecified.
#[derive(Debug)]
pub struct Decoder<T> {
    converter: Converter,
    state: ReadState,
    _value: PhantomData<fn() -> T>,
}

impl<T: WireType> Decoder<T> {
    pub fn new(options: &CodecOptions) -> Result<Self> {
        Self::with_factory(ConverterFactory::shared(options))
    }

    pub fn with_factory(factory: Arc<ConverterFactory>) -> Result<Self> {
        let converter = factory.get_for::<T>()?;
        Ok(Decoder {
            converter,
            state: ReadState::new(factory),
            _value: PhantomData,
        })
    }

    /// Bytes the decoder needs beyond what it has been given so far.
    pub fn bytes_needed(&self) -> usize {
        self.state.bytes_needed()
    }

    /// Whether a value is partly decoded.
    pub fn in_progress(&self) -> bool {
        !self.state.frames().is_empty()
    }

    pub fn decode(&mut self, input: &[u8]) -> Result<Decoded<T>> {
        let mut reader = ByteReader::new(input);
        let result = self.state.read_root(&mut reader, &self.converter);
        let consumed = reader.position();
        match result {
            Ok(Some(value)) => {
                self.state.reset();
                let value = T::from_value(value)?;
                Ok(Decoded::Complete { value, consumed })
            }
            Ok(None) => Ok(Decoded::Incomplete {
                consumed,
                needed: self.state.bytes_needed(),
            }),
            Err(error) => {
                self.state.reset();
                Err(error)
            }
        }
    }

    /// Decodes from the front of `buf`, advancing it past what was consumed.
    pub fn decode_buf(&mut self, buf: &mut BytesMut) -> Result<Option<T>> {
        match self.decode(buf)? {
            Decoded::Complete { value, consumed } => {
                buf.advance(consumed);
                Ok(Some(value))
            }
            Decoded::Incomplete { consumed, .. } => {
                buf.advance(consumed);
                Ok(None)
            }
        }
    }
}

impl Decoder<Value> {
    /// A decoder for an explicit shape, producing raw values.
    pub fn for_shape(shape: &Shape, factory: Arc<ConverterFactory>) -> Result<Self> {
        let converter = factory.get(shape)?;
        Ok(Decoder {
            converter,
            state: ReadState::new(factory),
            _value: PhantomData,
        })
    }
}

/// Writes one value into output windows of arbitrary size.
#[derive(Debug)]
pub struct Encoder {
    converter: Converter,
    value: Value,
    state: WriteState,
    done: bool,
}

impl Encoder {
    pub fn new<T: WireType>(value: &T, options: &CodecOptions) -> Result<Self> {
        Self::with_factory(value, ConverterFactory::shared(options))
    }

    pub fn with_factory<T: WireType>(value: &T, factory: Arc<ConverterFactory>) -> Result<Self> {
        let converter = factory.get_for::<T>()?;
        Ok(Self::from_parts(converter, value.to_value(), factory))
    }

    /// An encoder writing `value` with the converter for `shape`.
    pub fn for_shape(
        shape: &Shape,
        value: Value,
        factory: Arc<ConverterFactory>,
    ) -> Result<Self> {
        let converter = factory.get(shape)?;
        Ok(Self::from_parts(converter, value, factory))
    }

    fn from_parts(converter: Converter, value: Value, factory: Arc<ConverterFactory>) -> Self {
        Encoder {
            converter,
            value,
            state: WriteState::new(factory),
            done: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn encode(&mut self, window: &mut [u8]) -> Result<Encoded> {
        if self.done {
            return Ok(Encoded::Complete { written: 0 });
        }
        let mut writer = ByteWriter::new(window);
        let done = self
            .state
            .write_root(&mut writer, &self.converter, &self.value)?;
        let written = writer.position();
        if done {
            self.done = true;
            self.state.reset();
            return Ok(Encoded::Complete { written });
        }
        Ok(Encoded::Incomplete {
            written,
            needed: self.state.bytes_needed(),
        })
    }

    /// Runs the encoder to completion into a single buffer.
    pub fn finish(mut self) -> Result<Bytes> {
        let mut out = BytesMut::new();
        let mut window = INITIAL_WINDOW;
        loop {
            let start = out.len();
            out.resize(start + window, 0);
            match self.encode(&mut out[start..])? {
                Encoded::Complete { written } => {
                    out.truncate(start + written);
                    return Ok(out.freeze());
                }
                Encoded::Incomplete { written, needed } => {
                    out.truncate(start + written);
                    window = (window * 2).max(needed);
                }
            }
        }
    }
}

pub fn serialize<T: WireType>(value: &T, options: &CodecOptions) -> Result<Bytes> {
    Encoder::new(value, options)?.finish()
}

/// Decodes a complete value that must span all of `input`.
pub fn deserialize<T: WireType>(input: &[u8], options: &CodecOptions) -> Result<T> {
    let mut decoder = Decoder::<T>::new(options)?;
    match decoder.decode(input)? {
        Decoded::Complete { value, consumed } if consumed == input.len() => Ok(value),
        Decoded::Complete { consumed, .. } => Err(CodecError::TrailingBytes(input.len() - consumed)),
        Decoded::Incomplete { needed, .. } => Err(CodecError::UnexpectedEof { needed }),
    }
}

/// Decodes one value from `reader`, never reading past its end.
pub fn deserialize_from_reader<T: WireType, R: Read>(
    reader: &mut R,
    options: &CodecOptions,
) -> Result<T> {
    let mut decoder = Decoder::<T>::new(options)?;
    let mut buf = BytesMut::new();
    loop {
        if let Some(value) = decoder.decode_buf(&mut buf)? {
            return Ok(value);
        }
        let needed = decoder.bytes_needed();
        trace!(buffered = buf.len(), needed, "reading more input");
        let start = buf.len();
        buf.resize(start + needed, 0);
        reader.read_exact(&mut buf[start..]).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                CodecError::UnexpectedEof { needed }
            } else {
                CodecError::Io(e)
            }
        })?;
    }
}

#[cfg(test)]
mod unittests {
    use proptest::prelude::*;

    use super::*;
    use crate::arbitrary::{arb_cuts, arb_shaped_value, cut_points};

    fn factory() -> Arc<ConverterFactory> {
        ConverterFactory::shared(&CodecOptions::default())
    }

    fn encode_whole(shape: &Shape, value: &Value) -> Bytes {
        Encoder::for_shape(shape, value.clone(), factory())
            .unwrap()
            .finish()
            .unwrap()
    }

    /// Feeds `bytes` cut at `cuts`, carrying unconsumed input forward the
    /// way a stream reader would.
    fn decode_chunked(shape: &Shape, bytes: &[u8], cuts: &[usize]) -> Value {
        let mut decoder = Decoder::for_shape(shape, factory()).unwrap();
        let mut pending = BytesMut::new();
        let mut start = 0;
        for end in cuts.iter().copied().chain([bytes.len()]) {
            pending.extend_from_slice(&bytes[start..end]);
            start = end;
            if let Some(value) = decoder.decode_buf(&mut pending).unwrap() {
                assert_eq!(end, bytes.len(), "completed before the last chunk");
                assert!(pending.is_empty());
                return value;
            }
            assert!(decoder.bytes_needed() > 0);
        }
        panic!("input ran out with {} bytes still needed", decoder.bytes_needed());
    }

    proptest! {
        #[test]
        fn chunked_input_decodes_like_whole_input(
            (shape, value) in arb_shaped_value(),
            picks in arb_cuts(),
        ) {
            let bytes = encode_whole(&shape, &value);
            let cuts = cut_points(bytes.len(), &picks);
            prop_assert_eq!(decode_chunked(&shape, &bytes, &cuts), value);
        }

        #[test]
        fn small_windows_encode_like_one_window(
            (shape, value) in arb_shaped_value(),
            window in 1usize..48,
        ) {
            let whole = encode_whole(&shape, &value);
            let mut encoder = Encoder::for_shape(&shape, value, factory()).unwrap();
            let mut out = Vec::new();
            let mut size = window;
            loop {
                let mut buf = vec![0; size];
                match encoder.encode(&mut buf).unwrap() {
                    Encoded::Complete { written } => {
                        out.extend_from_slice(&buf[..written]);
                        break;
                    }
                    Encoded::Incomplete { written, needed } => {
                        out.extend_from_slice(&buf[..written]);
                        prop_assert!(needed > 0);
                        size = window.max(needed);
                    }
                }
            }
            prop_assert!(encoder.is_done());
            prop_assert_eq!(out, whole.to_vec());
        }
    }

    #[test]
    fn decoder_recovers_after_an_error() {
        let mut decoder = Decoder::<String>::new(&CodecOptions::default()).unwrap();
        assert!(matches!(
            decoder.decode(&[9]),
            Err(CodecError::InvalidMarker { marker: 9 })
        ));
        assert!(!decoder.in_progress());
        assert_eq!(
            decoder.decode(&[1, 2, 0, 0, 0, b'o', b'k']).unwrap(),
            Decoded::Complete {
                value: "ok".to_string(),
                consumed: 7
            }
        );
    }

    #[test]
    fn finished_encoder_writes_nothing_more() {
        let mut encoder = Encoder::new(&7u8, &CodecOptions::default()).unwrap();
        let mut window = [0u8; 4];
        assert_eq!(
            encoder.encode(&mut window).unwrap(),
            Encoded::Complete { written: 1 }
        );
        assert_eq!(
            encoder.encode(&mut window).unwrap(),
            Encoded::Complete { written: 0 }
        );
    }

    #[test]
    fn zero_sized_window_reports_what_it_needs() {
        let mut encoder = Encoder::new(&"abc".to_string(), &CodecOptions::default()).unwrap();
        assert_eq!(
            encoder.encode(&mut []).unwrap(),
            Encoded::Incomplete {
                written: 0,
                needed: 1
            }
        );
    }
}
