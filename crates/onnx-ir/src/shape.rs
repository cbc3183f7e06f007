// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dimension values for declared input/output shapes.

use std::fmt;

/// A single dimension of a declared graph input or output.
///
/// Symbolic dimensions (`"batch"`, `"seq_len"`) are kept as opaque tokens;
/// nothing in this crate tries to bind them to numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dim {
    /// A concrete, non-negative extent.
    Known(u64),
    /// A named dimension parameter.
    Symbolic(String),
    /// The shape entry is present but carries neither a value nor a name.
    Unknown,
}

impl Dim {
    /// Returns the concrete extent, if any.
    pub fn value(&self) -> Option<u64> {
        match self {
            Dim::Known(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns `true` unless this dimension is a positive concrete value.
    ///
    /// Zero counts as dynamic: exporters routinely write `0` for a batch
    /// axis they could not pin down.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Dim::Known(v) if *v > 0)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(v) => write!(f, "{v}"),
            Dim::Symbolic(s) => f.write_str(s),
            Dim::Unknown => f.write_str("?"),
        }
    }
}

/// JSON form: integers stay integers, symbols are strings, unknown is `-1`.
impl serde::Serialize for Dim {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Dim::Known(v) => serializer.serialize_u64(*v),
            Dim::Symbolic(s) => serializer.serialize_str(s),
            Dim::Unknown => serializer.serialize_i64(-1),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Dim {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            UInt(u64),
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::UInt(v) => Dim::Known(v),
            Raw::Int(_) => Dim::Unknown,
            Raw::Str(s) => Dim::Symbolic(s),
        })
    }
}

/// Formats a shape as `[1, batch, ?]`.
pub fn format_dims(dims: &[Dim]) -> String {
    let parts: Vec<String> = dims.iter().map(Dim::to_string).collect();
    format!("[{}]", parts.join(", "))
}
