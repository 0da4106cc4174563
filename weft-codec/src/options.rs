// SPDX-FileCopyrightText: 2026 Weft contributors
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

fn default_max_length() -> usize {
    i32::MAX as usize
}

fn default_max_depth() -> usize {
    128
}

/// Switches that change the object wire layout, plus input limits.
///
/// Converters are built per options value, so two factories with different
/// options never share converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
    /// Embed field names instead of relying on positional ordering.
    pub use_property_names: bool,
    /// Embed a type descriptor in front of every object field.
    pub include_property_types: bool,
    /// Ignore declared `#[index = N]` ordering overrides.
    pub ignore_index_attribute: bool,
    #[serde(default = "default_max_length")]
    pub max_collection_length: usize,
    #[serde(default = "default_max_length")]
    pub max_string_length: usize,
    /// Values nested deeper than this many frames are rejected.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            use_property_names: false,
            include_property_types: false,
            ignore_index_attribute: false,
            max_collection_length: default_max_length(),
            max_string_length: default_max_length(),
            max_depth: default_max_depth(),
        }
    }
}

impl CodecOptions {
    pub fn with_property_names(mut self) -> Self {
        self.use_property_names = true;
        self
    }

    pub fn with_property_types(mut self) -> Self {
        self.include_property_types = true;
        self
    }

    pub fn ignoring_index_attribute(mut self) -> Self {
        self.ignore_index_attribute = true;
        self
    }
}
