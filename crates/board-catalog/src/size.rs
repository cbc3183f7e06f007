// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory size values and parsing.
//!
//! Board datasheets quote RAM and Flash in binary kilobytes and megabytes;
//! [`MemorySize`] accepts the same shorthand in configuration files.

use crate::CatalogError;
use std::fmt;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * 1024 * 1024;

/// A byte count for a RAM or Flash region.
///
/// # Parsing
/// Supports human-readable strings with binary suffixes:
/// - `"96K"` or `"96KB"` → 96 × 1024 bytes
/// - `"4M"` or `"4MB"` → 4 × 1024² bytes
/// - `"1G"` or `"1GB"` → 1 × 1024³ bytes
/// - `"98304"` or `"98304B"` → raw byte count
///
/// # Examples
/// ```
/// use board_catalog::MemorySize;
///
/// let ram = MemorySize::parse("96K").unwrap();
/// assert_eq!(ram.as_bytes(), 98_304);
/// assert_eq!(ram.to_string(), "96 KB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemorySize {
    bytes: u64,
}

impl MemorySize {
    /// Creates a size from a byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Creates a size from kilobytes.
    pub const fn from_kb(kb: u64) -> Self {
        Self { bytes: kb * KB }
    }

    /// Creates a size from megabytes.
    pub const fn from_mb(mb: u64) -> Self {
        Self { bytes: mb * MB }
    }

    /// Returns the size in bytes.
    pub fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Parses a human-readable size string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidSize {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty string"));
        }

        let upper = trimmed.to_uppercase();
        let (num_str, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
            (n, GB)
        } else if let Some(n) = upper.strip_suffix('G') {
            (n, GB)
        } else if let Some(n) = upper.strip_suffix("MB") {
            (n, MB)
        } else if let Some(n) = upper.strip_suffix('M') {
            (n, MB)
        } else if let Some(n) = upper.strip_suffix("KB") {
            (n, KB)
        } else if let Some(n) = upper.strip_suffix('K') {
            (n, KB)
        } else if let Some(n) = upper.strip_suffix('B') {
            (n, 1)
        } else {
            (upper.as_str(), 1)
        };

        let value: u64 = num_str
            .trim()
            .parse()
            .map_err(|_| invalid("expected a number followed by an optional K, M or G suffix"))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| invalid("value overflows"))?;
        if bytes == 0 {
            return Err(invalid("size must be non-zero"));
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for MemorySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b >= GB && b % GB == 0 {
            write!(f, "{} GB", b / GB)
        } else if b >= MB && b % MB == 0 {
            write!(f, "{} MB", b / MB)
        } else if b >= KB && b % KB == 0 {
            write!(f, "{} KB", b / KB)
        } else {
            write!(f, "{b} B")
        }
    }
}

impl std::str::FromStr for MemorySize {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Serialized as the display string, so `"96 KB"` round-trips through
/// config files. Plain integers are accepted as byte counts.
impl serde::Serialize for MemorySize {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for MemorySize {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bytes(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bytes(0) => Err(serde::de::Error::custom("size must be non-zero")),
            Raw::Bytes(b) => Ok(Self::from_bytes(b)),
            Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kilobytes() {
        assert_eq!(MemorySize::parse("96K").unwrap().as_bytes(), 96 * 1024);
        assert_eq!(MemorySize::parse("512KB").unwrap().as_bytes(), 512 * 1024);
        assert_eq!(MemorySize::parse("320kb").unwrap().as_bytes(), 320 * 1024);
    }

    #[test]
    fn test_parse_megabytes_and_gigabytes() {
        assert_eq!(MemorySize::parse("4M").unwrap(), MemorySize::from_mb(4));
        assert_eq!(MemorySize::parse("4mb").unwrap(), MemorySize::from_mb(4));
        assert_eq!(MemorySize::parse("1G").unwrap().as_bytes(), 1 << 30);
    }

    #[test]
    fn test_parse_raw_bytes() {
        assert_eq!(MemorySize::parse("98304").unwrap(), MemorySize::from_kb(96));
        assert_eq!(MemorySize::parse("100B").unwrap().as_bytes(), 100);
        assert_eq!(MemorySize::parse("  2K  ").unwrap().as_bytes(), 2048);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(MemorySize::parse("").is_err());
        assert!(MemorySize::parse("lots").is_err());
        assert!(MemorySize::parse("0K").is_err());
        assert!(MemorySize::parse("-4K").is_err());
        assert!(MemorySize::parse("99999999999999999999G").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(MemorySize::from_kb(96).to_string(), "96 KB");
        assert_eq!(MemorySize::from_mb(4).to_string(), "4 MB");
        assert_eq!(MemorySize::from_bytes(1 << 30).to_string(), "1 GB");
        assert_eq!(MemorySize::from_bytes(1500).to_string(), "1500 B");
    }

    #[test]
    fn test_display_reparses() {
        for size in [MemorySize::from_kb(96), MemorySize::from_mb(4), MemorySize::from_bytes(7)] {
            assert_eq!(MemorySize::parse(&size.to_string()).unwrap(), size);
        }
    }

    #[test]
    fn test_serde_accepts_string_or_integer() {
        let a: MemorySize = serde_json::from_str("\"256K\"").unwrap();
        let b: MemorySize = serde_json::from_str("262144").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"256 KB\"");
        assert!(serde_json::from_str::<MemorySize>("0").is_err());
    }
}
