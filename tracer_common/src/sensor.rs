//! Line sensor snapshot types.
//!
//! - `SensorState` - the four readings of one control tick
//! - `SensorPattern` - the same readings packed as a 4-bit pattern
//!
//! Bit order is `s4 s3 s2 s1` with `s4` as the most significant bit, so
//! the textual form `"1000"` means only the leftmost sensor sees the line.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::consts::SENSOR_COUNT;

bitflags! {
    /// Packed sensor readings, one bit per sensor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SensorPattern: u8 {
        /// Sensor 1 (rightmost).
        const S1 = 0b0001;
        /// Sensor 2.
        const S2 = 0b0010;
        /// Sensor 3.
        const S3 = 0b0100;
        /// Sensor 4 (leftmost).
        const S4 = 0b1000;
    }
}

impl SensorPattern {
    /// Table index of this pattern (0..16).
    #[inline]
    pub const fn index(self) -> usize {
        self.bits() as usize
    }

    /// Build a pattern from a table index, ignoring bits above the sensor range.
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self::from_bits_truncate(index as u8)
    }
}

/// Snapshot of the four line sensors for one tick.
///
/// `true` means the line is under that sensor. All-false ("line lost") is
/// the `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SensorState {
    /// Sensor 1 (rightmost).
    pub s1: bool,
    /// Sensor 2.
    pub s2: bool,
    /// Sensor 3.
    pub s3: bool,
    /// Sensor 4 (leftmost).
    pub s4: bool,
}

impl SensorState {
    /// All sensors off the line.
    pub const LOST: Self = Self {
        s1: false,
        s2: false,
        s3: false,
        s4: false,
    };

    /// Create a snapshot from the individual readings.
    pub const fn new(s1: bool, s2: bool, s3: bool, s4: bool) -> Self {
        Self { s1, s2, s3, s4 }
    }

    /// True when no sensor sees the line.
    #[inline]
    pub const fn is_lost(&self) -> bool {
        !(self.s1 || self.s2 || self.s3 || self.s4)
    }

    /// Pack into a `SensorPattern`.
    pub fn pattern(&self) -> SensorPattern {
        let mut pattern = SensorPattern::empty();
        pattern.set(SensorPattern::S1, self.s1);
        pattern.set(SensorPattern::S2, self.s2);
        pattern.set(SensorPattern::S3, self.s3);
        pattern.set(SensorPattern::S4, self.s4);
        pattern
    }
}

impl From<SensorPattern> for SensorState {
    fn from(pattern: SensorPattern) -> Self {
        Self {
            s1: pattern.contains(SensorPattern::S1),
            s2: pattern.contains(SensorPattern::S2),
            s3: pattern.contains(SensorPattern::S3),
            s4: pattern.contains(SensorPattern::S4),
        }
    }
}

impl From<SensorState> for SensorPattern {
    fn from(state: SensorState) -> Self {
        state.pattern()
    }
}

impl From<[bool; SENSOR_COUNT]> for SensorState {
    fn from(r: [bool; SENSOR_COUNT]) -> Self {
        Self::new(r[0], r[1], r[2], r[3])
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in [self.s4, self.s3, self.s2, self.s1] {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Failed to parse a sensor pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sensor pattern {0:?} (expected 4 characters of '0'/'1', s4 first)")]
pub struct ParsePatternError(pub String);

impl FromStr for SensorState {
    type Err = ParsePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != SENSOR_COUNT {
            return Err(ParsePatternError(s.to_string()));
        }
        let mut bits = [false; SENSOR_COUNT];
        for (i, b) in bytes.iter().enumerate() {
            bits[i] = match b {
                b'0' => false,
                b'1' => true,
                _ => return Err(ParsePatternError(s.to_string())),
            };
        }
        // Text is s4 s3 s2 s1.
        Ok(Self::new(bits[3], bits[2], bits[1], bits[0]))
    }
}

impl Serialize for SensorState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SensorState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
