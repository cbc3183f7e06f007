// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor element data types.

use std::fmt;
use std::str::FromStr;

/// Element type of a tensor, keyed by the ONNX `TensorProto.DataType` code.
///
/// Codes without a named variant are kept as [`ElementType::Unknown`] so the
/// original tag survives into the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float32,
    Uint8,
    Int8,
    Uint16,
    Int16,
    Int32,
    Int64,
    String,
    Bool,
    Float16,
    Float64,
    Uint32,
    Uint64,
    BFloat16,
    /// Any other code (including `UNDEFINED = 0`).
    Unknown(i32),
}

impl ElementType {
    /// Maps an ONNX data-type code.
    pub fn from_onnx(code: i32) -> Self {
        match code {
            1 => Self::Float32,
            2 => Self::Uint8,
            3 => Self::Int8,
            4 => Self::Uint16,
            5 => Self::Int16,
            6 => Self::Int32,
            7 => Self::Int64,
            8 => Self::String,
            9 => Self::Bool,
            10 => Self::Float16,
            11 => Self::Float64,
            12 => Self::Uint32,
            13 => Self::Uint64,
            16 => Self::BFloat16,
            other => Self::Unknown(other),
        }
    }

    /// Like [`from_onnx`](Self::from_onnx), but reports unmapped codes as
    /// `Float32`. Used for declared graph inputs and outputs.
    pub fn from_onnx_or_float(code: i32) -> Self {
        match Self::from_onnx(code) {
            Self::Unknown(_) => Self::Float32,
            known => known,
        }
    }

    /// Returns the ONNX data-type code.
    pub fn onnx_code(self) -> i32 {
        match self {
            Self::Float32 => 1,
            Self::Uint8 => 2,
            Self::Int8 => 3,
            Self::Uint16 => 4,
            Self::Int16 => 5,
            Self::Int32 => 6,
            Self::Int64 => 7,
            Self::String => 8,
            Self::Bool => 9,
            Self::Float16 => 10,
            Self::Float64 => 11,
            Self::Uint32 => 12,
            Self::Uint64 => 13,
            Self::BFloat16 => 16,
            Self::Unknown(code) => code,
        }
    }

    /// Returns a lowercase label (`"float32"`, `"int8"`, ...).
    ///
    /// Unknown codes have no static label; see the [`fmt::Display`] impl.
    pub fn as_str(self) -> Option<&'static str> {
        Some(match self {
            Self::Float32 => "float32",
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Float16 => "float16",
            Self::Float64 => "float64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::BFloat16 => "bfloat16",
            Self::Unknown(_) => return None,
        })
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => write!(f, "unknown({})", self.onnx_code()),
        }
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = match s {
            "float32" => Self::Float32,
            "uint8" => Self::Uint8,
            "int8" => Self::Int8,
            "uint16" => Self::Uint16,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "string" => Self::String,
            "bool" => Self::Bool,
            "float16" => Self::Float16,
            "float64" => Self::Float64,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "bfloat16" => Self::BFloat16,
            other => {
                let code = other
                    .strip_prefix("unknown(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .and_then(|n| n.parse::<i32>().ok())
                    .ok_or_else(|| format!("unrecognised element type '{other}'"))?;
                Self::Unknown(code)
            }
        };
        Ok(known)
    }
}

impl serde::Serialize for ElementType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ElementType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        assert_eq!(ElementType::from_onnx(1), ElementType::Float32);
        assert_eq!(ElementType::from_onnx(3), ElementType::Int8);
        assert_eq!(ElementType::from_onnx(10), ElementType::Float16);
        assert_eq!(ElementType::from_onnx(16), ElementType::BFloat16);
        assert_eq!(ElementType::from_onnx(14), ElementType::Unknown(14));
        assert_eq!(ElementType::from_onnx(0), ElementType::Unknown(0));
    }

    #[test]
    fn test_float_fallback_for_io() {
        assert_eq!(ElementType::from_onnx_or_float(0), ElementType::Float32);
        assert_eq!(ElementType::from_onnx_or_float(7), ElementType::Int64);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(ElementType::Float32.to_string(), "float32");
        assert_eq!(ElementType::Unknown(15).to_string(), "unknown(15)");
        assert_eq!("uint16".parse::<ElementType>(), Ok(ElementType::Uint16));
        assert_eq!(
            "unknown(15)".parse::<ElementType>(),
            Ok(ElementType::Unknown(15))
        );
        assert!("complex64".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_onnx_code_inverse() {
        for code in 0..20 {
            assert_eq!(ElementType::from_onnx(code).onnx_code(), code);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ElementType::Int8).unwrap();
        assert_eq!(json, "\"int8\"");
        let back: ElementType = serde_json::from_str("\"unknown(99)\"").unwrap();
        assert_eq!(back, ElementType::Unknown(99));
    }
}
