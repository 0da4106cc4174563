// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use weft_codec::CodecOptions;

use crate::error::ConfigError;

/// Environment variable naming the config file read by
/// [`StreamConfig::from_env`].
pub const CONFIG_ENV: &str = "WEFT_CONFIG_FILE";

fn default_buffer_size() -> usize {
    8 * 1024
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    #[serde(default)]
    pub codec: CodecOptions,
    /// Size of the output window used by writers, and the most a reader
    /// asks of its source in one read.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            codec: CodecOptions::default(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl StreamConfig {
    pub fn load(path: &Path) -> Result<StreamConfig, ConfigError> {
        let contents = read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<StreamConfig, ConfigError> {
        let config: StreamConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `WEFT_CONFIG_FILE`, or the defaults when it
    /// is unset.
    pub fn from_env() -> Result<StreamConfig, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                debug!(path, "loading stream config");
                Self::load(Path::new(&path))
            }
            Err(_) => Ok(StreamConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            reason: reason.to_string(),
        };
        if self.buffer_size == 0 {
            return Err(invalid("buffer_size must be greater than 0"));
        }
        if self.codec.max_collection_length == 0 {
            return Err(invalid("codec.max_collection_length must be greater than 0"));
        }
        if self.codec.max_string_length == 0 {
            return Err(invalid("codec.max_string_length must be greater than 0"));
        }
        if self.codec.max_depth == 0 {
            return Err(invalid("codec.max_depth must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod unittests {
    use std::io::Write;

    use rstest::rstest;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(
            StreamConfig::from_toml_str("").unwrap(),
            StreamConfig::default()
        );
    }

    #[test]
    fn codec_table_is_read() {
        let config = StreamConfig::from_toml_str(
            r#"
            buffer_size = 512

            [codec]
            use_property_names = true
            max_string_length = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.buffer_size, 512);
        assert!(config.codec.use_property_names);
        assert!(!config.codec.include_property_types);
        assert_eq!(config.codec.max_string_length, 4096);
        assert_eq!(config.codec.max_collection_length, i32::MAX as usize);
    }

    #[rstest]
    #[case::zero_buffer("buffer_size = 0")]
    #[case::zero_collections("[codec]\nmax_collection_length = 0")]
    #[case::zero_strings("[codec]\nmax_string_length = 0")]
    #[case::zero_depth("[codec]\nmax_depth = 0")]
    fn invalid_values_are_rejected(#[case] contents: &str) {
        let err = StreamConfig::from_toml_str(contents).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }

    #[rstest]
    #[case::top_level("buffer = 10")]
    #[case::codec("[codec]\nnames = true")]
    fn unknown_keys_are_rejected(#[case] contents: &str) {
        let err = StreamConfig::from_toml_str(contents).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)), "{err}");
    }

    #[test]
    fn load_reads_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "buffer_size = 64").unwrap();
        let config = StreamConfig::load(file.path()).unwrap();
        assert_eq!(config.buffer_size, 64);
    }

    #[test]
    fn load_reports_the_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = StreamConfig::load(&path).unwrap_err();
        assert!(
            matches!(&err, ConfigError::ReadFile { path: p, .. } if p.ends_with("absent.toml")),
            "{err}"
        );
    }

    #[test]
    fn config_survives_toml_round_trip() {
        let config = StreamConfig {
            codec: CodecOptions::default().with_property_types(),
            buffer_size: 99,
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(StreamConfig::from_toml_str(&text).unwrap(), config);
    }
}
