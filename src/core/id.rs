//! Item identifiers
//!
//! Items are identified by 12 raw bytes rendered as 24 lowercase hex
//! characters. The first four bytes of a generated id are the UNIX creation
//! time, the remaining eight are random.

use crate::core::error::ListError;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

static HEX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("valid id regex"));

/// Identifier of an item in any list
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId([u8; 12]);

impl ItemId {
    /// Generate a fresh id from the current time and random bytes
    pub fn new() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(bytes)
    }

    /// Parse an id from a JSON value, accepting only strings
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ListError> {
        match value.as_str() {
            Some(s) => s.parse(),
            None => Err(ListError::InvalidId {
                value: value.to_string(),
            }),
        }
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ItemId {
    type Err = ListError;

    /// Accepts the 24 character hex form, or any 12 byte string whose raw
    /// bytes become the id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 12];

        if HEX_ID.is_match(s) {
            for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
                // Regex guarantees ASCII hex, so the slice is valid UTF-8
                let pair = std::str::from_utf8(chunk).map_err(|_| ListError::InvalidId {
                    value: s.to_string(),
                })?;
                bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| ListError::InvalidId {
                    value: s.to_string(),
                })?;
            }
            return Ok(Self(bytes));
        }

        if s.len() == 12 {
            bytes.copy_from_slice(s.as_bytes());
            return Ok(Self(bytes));
        }

        Err(ListError::InvalidId {
            value: s.to_string(),
        })
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
