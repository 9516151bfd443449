//! Hysteresis store: the last sensor pattern the loop acted upon.
//!
//! Holds the *effective* pattern of the previous tick (raw reading, or the
//! pattern substituted during a line-lost tick). Starts all-false and is
//! only ever overwritten by the control loop, once per tick, after the
//! command for that tick has been computed.

use tracer_common::sensor::SensorState;

/// Process-lifetime memory of the last consumed sensor pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HysteresisStore {
    pattern: SensorState,
}

impl HysteresisStore {
    /// Empty store (all sensors off the line).
    pub const fn new() -> Self {
        Self {
            pattern: SensorState::LOST,
        }
    }

    /// Store pre-loaded with a pattern.
    pub const fn with_pattern(pattern: SensorState) -> Self {
        Self { pattern }
    }

    /// The stored pattern.
    #[inline]
    pub const fn pattern(&self) -> SensorState {
        self.pattern
    }

    /// Overwrite with the effective pattern of the tick just decided.
    #[inline]
    pub fn record(&mut self, effective: SensorState) {
        self.pattern = effective;
    }
}
