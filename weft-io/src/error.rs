// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use thiserror::Error;
use weft_codec::CodecError;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Stream ended with {needed} more bytes required")]
    UnexpectedEof { needed: usize },
}

// Framed transports hand us bare IO errors.
impl From<std::io::Error> for StreamError {
    fn from(source: std::io::Error) -> Self {
        StreamError::Io {
            context: "Transport failed".into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

pub type Result<T> = std::result::Result<T, StreamError>;

pub trait IoErrorContext<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> IoErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| StreamError::Io {
            context: context.into(),
            source: e,
        })
    }
}
