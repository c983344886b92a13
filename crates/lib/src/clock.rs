//! Logical clock for minting operation identifiers
//!
//! Every replica owns a [`Clock`]: a monotonically increasing `count` combined with
//! a `seed` derived from the replica identifier. Together they mint identifiers of
//! the form `"<count>.<seed>"` that are unique across the network and totally
//! ordered within one replica.
//!
//! # Example
//!
//! ```
//! use replidoc::clock::Clock;
//!
//! let mut clock = Clock::new("replica-a");
//! assert_eq!(clock.count(), 1);
//!
//! let first = clock.mint()?;
//! let second = clock.mint()?;
//! assert!(second > first);
//!
//! // Merging a remote timestamp only ever raises the count
//! clock.update_str(&format!("10.{}", clock.seed() + 1))?;
//! assert_eq!(clock.count(), 10);
//! clock.update_str("4.1")?;
//! assert_eq!(clock.count(), 10);
//! # Ok::<(), replidoc::clock::ClockError>(())
//! ```

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operation::{OpId, id::parse_parts};

/// Error type for clock and timestamp parsing failures.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    /// A timestamp string is not of the form `<int>.<int>`.
    #[error("Invalid timestamp '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// The count has reached its maximum and cannot advance.
    #[error("Clock count {count} cannot advance")]
    Exhausted { count: u64 },
}

impl ClockError {
    /// Check if this error is a parse failure
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ClockError::Parse { .. })
    }

    /// Check if this error is a clock that can no longer advance
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ClockError::Exhausted { .. })
    }
}

// Conversion from ClockError to the main Error type
impl From<ClockError> for crate::Error {
    fn from(err: ClockError) -> Self {
        crate::Error::Clock(err)
    }
}

/// Derives a replica seed from its identifier bytes.
///
/// The first four bytes of the BLAKE3 digest, read little endian. Stable across
/// restarts and collision-free with high probability.
fn seed_from(bytes: &[u8]) -> u64 {
    let hash = blake3::hash(bytes);
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&hash.as_bytes()[..4]);
    u32::from_le_bytes(prefix) as u64
}

/// A per-replica logical clock.
///
/// Clocks compare by `count` first and then by `seed` as an integer, the same
/// order [`OpId`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clock {
    seed: u64,
    count: u64,
}

impl Clock {
    /// Largest count a clock mints or a replica accepts in an operation ID.
    pub const MAX_COUNT: u64 = u64::MAX - 1;

    /// Create a clock seeded from a replica identifier, with `count = 1`.
    pub fn new(seed: impl AsRef<[u8]>) -> Self {
        Self {
            seed: seed_from(seed.as_ref()),
            count: 1,
        }
    }

    /// Create a clock from explicit components.
    pub fn from_parts(count: u64, seed: u64) -> Self {
        Self { seed, count }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the replica identity of this clock (its seed as a string).
    pub fn id(&self) -> String {
        self.seed.to_string()
    }

    /// Advance the clock for a local event.
    ///
    /// # Errors
    /// [`ClockError::Exhausted`] if the count has reached [`Clock::MAX_COUNT`].
    pub fn tick(&mut self) -> Result<(), ClockError> {
        match self.count.checked_add(1) {
            Some(next) if next <= Self::MAX_COUNT => {
                self.count = next;
                Ok(())
            }
            _ => Err(ClockError::Exhausted { count: self.count }),
        }
    }

    /// Returns the canonical `"<count>.<seed>"` timestamp.
    pub fn timestamp(&self) -> String {
        self.to_string()
    }

    /// Returns the current timestamp as an operation identifier.
    pub fn current(&self) -> OpId {
        OpId::new(self.count, self.seed)
    }

    /// Tick, then return the new timestamp as an operation identifier.
    ///
    /// Ticking first means a minted ID is always greater than every timestamp
    /// previously merged through [`Clock::update`].
    pub fn mint(&mut self) -> Result<OpId, ClockError> {
        self.tick()?;
        Ok(self.current())
    }

    /// Returns true if `id` was minted under this clock's seed.
    pub fn owns(&self, id: &OpId) -> bool {
        id.seed() == self.seed
    }

    /// Merge another clock: raise `count` to the other's `count` iff the other
    /// clock orders strictly greater. The seed never changes.
    pub fn update(&mut self, other: &Clock) {
        if *other > *self {
            self.count = other.count;
        }
    }

    /// Merge a clock given in its `"<count>.<seed>"` string form.
    pub fn update_str(&mut self, other: &str) -> Result<(), ClockError> {
        let other: Clock = other.parse()?;
        self.update(&other);
        Ok(())
    }
}

impl From<OpId> for Clock {
    fn from(id: OpId) -> Self {
        Self::from_parts(id.count(), id.seed())
    }
}

impl PartialOrd for Clock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Clock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.current().cmp(&other.current())
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.count, self.seed)
    }
}

impl FromStr for Clock {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, seed) = parse_parts(s).map_err(|reason| ClockError::Parse {
            input: s.to_string(),
            reason,
        })?;
        Ok(Self::from_parts(count, seed))
    }
}
