//! Operation identifier type used throughout Replidoc.
//!
//! The `OpId` type is the parsed form of a `"<count>.<seed>"` timestamp.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::OperationError;

/// A globally unique operation identifier.
///
/// `count` is the minting replica's logical time and `seed` identifies the
/// replica. IDs order by `count` first and then by `seed` as an integer, which
/// gives every replica the same total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId {
    count: u64,
    seed: u64,
}

impl OpId {
    /// Creates an ID from its components.
    pub fn new(count: u64, seed: u64) -> Self {
        Self { count, seed }
    }

    /// Returns the logical time component.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the replica seed component.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Splits a `"<int>.<int>"` string into its two components.
///
/// Only the canonical form is accepted: ASCII digits with no sign and no
/// leading zeros, so every identifier has exactly one spelling.
pub(crate) fn parse_parts(s: &str) -> std::result::Result<(u64, u64), String> {
    let (count, seed) = s
        .split_once('.')
        .ok_or_else(|| "expected <count>.<seed>".to_string())?;
    Ok((parse_component("count", count)?, parse_component("seed", seed)?))
}

fn parse_component(name: &str, digits: &str) -> std::result::Result<u64, String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {name} '{digits}': expected decimal digits"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(format!("invalid {name} '{digits}': leading zero"));
    }
    digits
        .parse::<u64>()
        .map_err(|e| format!("invalid {name} '{digits}': {e}"))
}

impl FromStr for OpId {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, seed) = parse_parts(s).map_err(|reason| OperationError::MalformedId {
            id: s.to_string(),
            reason,
        })?;
        Ok(Self { count, seed })
    }
}

impl TryFrom<&str> for OpId {
    type Error = OperationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.count, self.seed)
    }
}

impl PartialEq<str> for OpId {
    fn eq(&self, other: &str) -> bool {
        other.parse::<OpId>().is_ok_and(|id| id == *self)
    }
}

impl PartialEq<&str> for OpId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

// Manual Serialize/Deserialize implementations for the canonical string form
impl Serialize for OpId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OpId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
