// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

//! Reading and writing single values over async byte streams.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};
use weft_codec::{Decoder, Encoded, Encoder, WireType};

use crate::config::StreamConfig;
use crate::error::{IoErrorContext, Result, StreamError};

/// Reads one value from `reader`.
///
/// Only the bytes the value occupies are read, so the reader is left
/// positioned at whatever follows it.
pub async fn read_value<T, R>(reader: &mut R, config: &StreamConfig) -> Result<T>
where
    T: WireType,
    R: AsyncRead + Unpin,
{
    let mut decoder = Decoder::<T>::new(&config.codec)?;
    let mut buf = BytesMut::new();
    loop {
        if let Some(value) = decoder.decode_buf(&mut buf)? {
            return Ok(value);
        }
        let needed = decoder.bytes_needed();
        let want = needed.min(config.buffer_size).max(1);
        trace!(buffered = buf.len(), needed, want, "reading more input");
        let start = buf.len();
        buf.resize(start + want, 0);
        let mut filled = 0;
        while filled < want {
            let n = reader
                .read(&mut buf[start + filled..])
                .await
                .io_context("Failed to read value")?;
            if n == 0 {
                return Err(StreamError::UnexpectedEof {
                    needed: needed - filled,
                });
            }
            filled += n;
        }
    }
}

/// Writes `value` to `writer` through a window of `buffer_size` bytes and
/// flushes it.
pub async fn write_value<T, W>(writer: &mut W, value: &T, config: &StreamConfig) -> Result<()>
where
    T: WireType,
    W: AsyncWrite + Unpin,
{
    let mut encoder = Encoder::new(value, &config.codec)?;
    let mut window = vec![0; config.buffer_size.max(1)];
    loop {
        let (written, needed) = match encoder.encode(&mut window)? {
            Encoded::Complete { written } => (written, None),
            Encoded::Incomplete { written, needed } => (written, Some(needed)),
        };
        writer
            .write_all(&window[..written])
            .await
            .io_context("Failed to write value")?;
        match needed {
            None => break,
            Some(needed) if needed > window.len() => {
                debug!(needed, window = window.len(), "growing output window");
                window.resize(needed, 0);
            }
            Some(_) => {}
        }
    }
    writer.flush().await.io_context("Failed to flush value")?;
    Ok(())
}

#[cfg(test)]
mod unittests {
    use hex_literal::hex;
    use tokio_test::io::Builder;
    use weft_codec::{CodecOptions, serialize};

    use super::*;

    fn config(buffer_size: usize) -> StreamConfig {
        StreamConfig {
            codec: CodecOptions::default(),
            buffer_size,
        }
    }

    #[test_log::test(tokio::test)]
    async fn reads_value_split_across_reads() {
        let mut reader = Builder::new()
            .read(&hex!("01 03"))
            .read(&hex!("000000 01000000 0200"))
            .read(&hex!("0000 03000000"))
            .build();
        let value: Vec<i32> = read_value(&mut reader, &config(64)).await.unwrap();
        assert_eq!(value, [1, 2, 3]);
    }

    #[test_log::test(tokio::test)]
    async fn leaves_following_bytes_unread() {
        let mut input: &[u8] = &hex!("01 02000000 6869 ff");
        let value: String = read_value(&mut input, &config(64)).await.unwrap();
        assert_eq!(value, "hi");
        assert_eq!(input, hex!("ff"));
    }

    #[test_log::test(tokio::test)]
    async fn small_buffer_still_reads_whole_primitives() {
        let bytes = serialize(&u64::MAX, &CodecOptions::default()).unwrap();
        let mut input = &bytes[..];
        let value: u64 = read_value(&mut input, &config(3)).await.unwrap();
        assert_eq!(value, u64::MAX);
    }

    #[test_log::test(tokio::test)]
    async fn early_end_reports_the_shortfall() {
        let mut reader = Builder::new().read(&hex!("01 05000000 6162")).build();
        let err = read_value::<String, _>(&mut reader, &config(64))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::UnexpectedEof { needed: 3 }), "{err}");
    }

    #[test_log::test(tokio::test)]
    async fn writes_through_a_small_window() {
        let value = "a longer string".to_string();
        let expected = serialize(&value, &CodecOptions::default()).unwrap();
        let mut writer = Builder::new().write(&expected).build();
        write_value(&mut writer, &value, &config(4)).await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn window_grows_for_wide_primitives() {
        let mut out = Vec::new();
        write_value(&mut out, &-2i64, &config(1)).await.unwrap();
        assert_eq!(out, hex!("feffffffffffffff"));
    }
}
