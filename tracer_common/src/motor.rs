//! Motor command types.
//!
//! A `MotorCommand` is the output of one decision: a direction and a speed
//! per side. Speeds are carried wider than the wire byte so an out-of-range
//! value stays visible until the encoder rejects it.

use static_assertions::const_assert_eq;

/// Wheel direction as understood by the motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Direction {
    /// Wheel turns backwards.
    Reverse = 0,
    /// Wheel turns forwards.
    #[default]
    Forward = 1,
}

const_assert_eq!(core::mem::size_of::<Direction>(), 1);

impl Direction {
    /// Wire encoding of the direction.
    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Left/right wheel speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeedPair {
    /// Left wheel speed.
    pub left: u16,
    /// Right wheel speed.
    pub right: u16,
}

impl SpeedPair {
    /// Create a speed pair.
    pub const fn new(left: u16, right: u16) -> Self {
        Self { left, right }
    }
}

impl From<(u16, u16)> for SpeedPair {
    fn from((left, right): (u16, u16)) -> Self {
        Self { left, right }
    }
}

/// Differential drive command for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotorCommand {
    /// Left wheel direction.
    pub left_direction: Direction,
    /// Left wheel speed (valid range 0..=255).
    pub left_speed: u16,
    /// Right wheel direction.
    pub right_direction: Direction,
    /// Right wheel speed (valid range 0..=255).
    pub right_speed: u16,
}

impl MotorCommand {
    /// Both wheels forward at the given speeds.
    pub const fn forward(speeds: SpeedPair) -> Self {
        Self {
            left_direction: Direction::Forward,
            left_speed: speeds.left,
            right_direction: Direction::Forward,
            right_speed: speeds.right,
        }
    }
}
